// Dialogue script sourcing
//
// Turns repository content into speaker-tagged dialogue scripts:
// - github: fetches trending repositories and README content with a file cache
// - converter: drives an LLM CLI to produce the dialogue, with a fallback

pub mod converter;
pub mod github;

pub use converter::DialogueConverter;
pub use github::{GitHubContentFetcher, RepoContent, RepoSummary};
