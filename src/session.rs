//! One format or diff operation against a host
//!
//! [`Formatter`] ties the pieces together: negotiate the encoding, build the
//! command line and environment, run Black, then apply the outcome. Nothing is
//! kept between calls.

use tracing::debug;

use crate::apply::{apply_outcome, Applied, ApplyContext};
use crate::command::{build_command, DIFF_FLAG};
use crate::config::Config;
use crate::encoding;
use crate::env::build_env;
use crate::host::Host;
use crate::invoke::{invoke, working_dir, InvocationRequest};
use crate::platform::Platform;
use crate::Result;

/// Runs Black for a host buffer
#[derive(Debug, Clone)]
pub struct Formatter {
    config: Config,
    platform: Platform,
}

/// A request ready to run, plus the encoding it was built with
#[derive(Debug, Clone)]
pub struct Prepared {
    pub request: InvocationRequest,
    pub encoding: String,
}

impl Formatter {
    #[must_use]
    pub fn new(config: Config, platform: Platform) -> Self {
        Formatter { config, platform }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Format the buffer in place
    pub fn format<H: Host + ?Sized>(&self, host: &mut H) -> Result<Applied> {
        self.run(host, false)
    }

    /// Show what formatting would change, without touching the buffer
    pub fn diff<H: Host + ?Sized>(&self, host: &mut H) -> Result<Applied> {
        self.run(host, true)
    }

    /// Build the invocation for the host's current buffer
    pub fn prepare<H: Host + ?Sized>(&self, host: &H, diff: bool) -> Result<Prepared> {
        let buffer = host.read_buffer()?;
        let encoding = encoding::negotiate(
            buffer.encoding.as_deref(),
            &buffer.text,
            &self.config.default_encoding,
        );
        let input = encoding::encode(&buffer.text, &encoding)?;

        let file_path = host.file_path();
        let extra = if diff {
            vec![DIFF_FLAG.to_string()]
        } else {
            Vec::new()
        };
        let args = build_command(&self.config, file_path.as_deref(), &extra);
        let cwd = working_dir(file_path.as_deref(), &host.project_folders());
        debug!(%encoding, ?cwd, "prepared formatter invocation");

        Ok(Prepared {
            request: InvocationRequest {
                args,
                env: build_env(true, self.platform),
                cwd,
                input,
            },
            encoding,
        })
    }

    fn run<H: Host + ?Sized>(&self, host: &mut H, diff: bool) -> Result<Applied> {
        let prepared = self.prepare(host, diff)?;
        let outcome = invoke(&prepared.request, self.platform)?;
        let ctx = ApplyContext {
            encoding: &prepared.encoding,
            input: &prepared.request.input,
            diff,
            markers: &self.config.markers,
        };
        apply_outcome(host, &outcome, &ctx)
    }
}
