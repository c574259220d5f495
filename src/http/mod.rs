use crate::errors::Result;

pub mod client;
pub use client::*;

/// Something able to download a published sheet as text
pub trait Fetcher {
    /// GET `url` and return the body. Non-2xx answers are errors.
    fn fetch_text(&self, url: &str) -> Result<String>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch_text(&self, url: &str) -> Result<String> {
        (**self).fetch_text(url)
    }
}

pub mod mock {

    use super::*;
    use crate::errors::Error;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned answers per URL. A URL without an answer fails with a 404,
    /// a URL registered with `fail` answers 503.
    #[derive(Default)]
    pub struct MockFetcher {
        bodies: RefCell<HashMap<String, Option<String>>>,
        calls: RefCell<HashMap<String, usize>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            MockFetcher::default()
        }

        /// Answer `url` with `body` from now on
        pub fn serve(&self, url: &str, body: &str) {
            self.bodies
                .borrow_mut()
                .insert(url.to_string(), Some(body.to_string()));
        }

        /// Make `url` fail from now on
        pub fn fail(&self, url: &str) {
            self.bodies.borrow_mut().insert(url.to_string(), None);
        }

        /// How many times `url` was requested
        pub fn calls(&self, url: &str) -> usize {
            self.calls.borrow().get(url).copied().unwrap_or(0)
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch_text(&self, url: &str) -> Result<String> {
            *self.calls.borrow_mut().entry(url.to_string()).or_insert(0) += 1;

            match self.bodies.borrow().get(url) {
                Some(Some(body)) => Ok(body.clone()),
                Some(None) => Err(Error::Status {
                    url: url.to_string(),
                    status: 503,
                }),
                None => Err(Error::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }
}
