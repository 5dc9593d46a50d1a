use crate::{Driver, Executor, QuillError, Result};
use std::future::Future;

pub trait Connection: Executor {
    /// Open a connection to the given URL, the scheme must be the driver name.
    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send;

    /// Check the scheme of `url` and return the rest of it.
    fn strip_scheme(url: &str) -> Result<&str> {
        let name = <Self::Driver as Driver>::NAME;
        url.strip_prefix(name)
            .and_then(|v| v.strip_prefix("://"))
            .ok_or_else(|| {
                let error = QuillError::Configuration(format!(
                    "expected a connection URL starting with `{}://`, found `{}`",
                    name, url
                ));
                log::error!("{:#}", error);
                error.into()
            })
    }
}
