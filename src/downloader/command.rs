// Default argument builder: every present option cell, then the URL

use super::options::Options;
use super::traits::CommandBuilder;

#[derive(Debug, Clone, Default)]
pub struct ArgumentBuilder;

impl CommandBuilder for ArgumentBuilder {
    fn build(&self, options: &Options, url: &str) -> Vec<String> {
        let mut args = options.to_args();
        // Keep URLs that start with '-' from being read as flags
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}
