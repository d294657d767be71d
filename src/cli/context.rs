use std::sync::Arc;

use crate::config::Config;

use super::output::OutputFormat;

pub struct CliContext {
    config: Arc<Config>,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: Config, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            output,
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}
