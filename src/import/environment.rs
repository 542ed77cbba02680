//! Target environment receiving stylesheet links and scripts

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use thiserror::Error;

/// A script that reported an error instead of loading
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("script \"{src}\" failed to load: {reason}")]
pub struct ScriptLoadError {
    pub src: String,
    pub reason: String,
}

impl ScriptLoadError {
    pub fn new(src: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            reason: reason.into(),
        }
    }
}

/// The document head that stylesheets and scripts are inserted into
///
/// Methods take `&self`: an environment is shared by every import and
/// keeps its own state.
pub trait Environment {
    /// Whether a stylesheet link with this resolved path exists
    fn has_stylesheet(&self, href: &str) -> bool;

    /// Insert a stylesheet link; loading is not awaited
    fn insert_stylesheet(&self, href: &str);

    /// Whether a script with this resolved path exists
    fn has_script(&self, src: &str) -> bool;

    /// Insert a script, returning a future that resolves once it has loaded
    /// or failed
    ///
    /// The script must count as present for [`Environment::has_script`]
    /// as soon as this returns.
    fn insert_script(&self, src: &str) -> LocalBoxFuture<'static, Result<(), ScriptLoadError>>;
}

type LoadSender = oneshot::Sender<Result<(), ScriptLoadError>>;

#[derive(Default)]
struct Head {
    stylesheets: Vec<String>,
    scripts: Vec<String>,
    failing: HashSet<String>,
    deferred: bool,
    pending: HashMap<String, Vec<LoadSender>>,
}

/// An environment kept in memory; clones share the same head
///
/// By default scripts load as soon as they are inserted. With
/// [`InMemoryEnvironment::with_deferred_scripts`] each load stays pending
/// until [`InMemoryEnvironment::complete_script`] is called for it.
#[derive(Clone, Default)]
pub struct InMemoryEnvironment {
    head: Rc<RefCell<Head>>,
}

impl InMemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep script loads pending until completed explicitly
    pub fn with_deferred_scripts(self) -> Self {
        self.head.borrow_mut().deferred = true;
        self
    }

    /// Start with a stylesheet link already present
    pub fn with_stylesheet(self, href: impl Into<String>) -> Self {
        self.head.borrow_mut().stylesheets.push(href.into());
        self
    }

    /// Start with a script already present
    pub fn with_script(self, src: impl Into<String>) -> Self {
        self.head.borrow_mut().scripts.push(src.into());
        self
    }

    /// Make every load of `src` fail
    pub fn fail_script(&self, src: impl Into<String>) {
        self.head.borrow_mut().failing.insert(src.into());
    }

    /// Finish pending loads of `src`, returning how many were waiting
    pub fn complete_script(&self, src: &str, result: Result<(), ScriptLoadError>) -> usize {
        let senders = self.head.borrow_mut().pending.remove(src).unwrap_or_default();
        let count = senders.len();
        for sender in senders {
            // The import may have been dropped; nobody is left to notify
            let _ = sender.send(result.clone());
        }
        count
    }

    /// Scripts inserted but not yet completed
    pub fn pending_scripts(&self) -> Vec<String> {
        let mut pending: Vec<String> = self.head.borrow().pending.keys().cloned().collect();
        pending.sort();
        pending
    }

    pub fn stylesheets(&self) -> Vec<String> {
        self.head.borrow().stylesheets.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.head.borrow().scripts.clone()
    }
}

impl fmt::Debug for InMemoryEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.head.borrow();
        f.debug_struct("InMemoryEnvironment")
            .field("stylesheets", &head.stylesheets)
            .field("scripts", &head.scripts)
            .field("deferred", &head.deferred)
            .finish_non_exhaustive()
    }
}

impl Environment for InMemoryEnvironment {
    fn has_stylesheet(&self, href: &str) -> bool {
        self.head.borrow().stylesheets.iter().any(|s| s == href)
    }

    fn insert_stylesheet(&self, href: &str) {
        self.head.borrow_mut().stylesheets.push(href.to_string());
    }

    fn has_script(&self, src: &str) -> bool {
        self.head.borrow().scripts.iter().any(|s| s == src)
    }

    fn insert_script(&self, src: &str) -> LocalBoxFuture<'static, Result<(), ScriptLoadError>> {
        let mut head = self.head.borrow_mut();
        head.scripts.push(src.to_string());

        if head.failing.contains(src) {
            let error = ScriptLoadError::new(src, "load error");
            return future::ready(Err(error)).boxed_local();
        }
        if !head.deferred {
            return future::ready(Ok(())).boxed_local();
        }

        let (sender, receiver) = oneshot::channel();
        head.pending.entry(src.to_string()).or_default().push(sender);

        let src = src.to_string();
        async move {
            receiver.await.unwrap_or_else(|_| {
                Err(ScriptLoadError::new(
                    src,
                    "environment dropped before the script finished loading",
                ))
            })
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_immediate_load() {
        let env = InMemoryEnvironment::new();
        assert!(!env.has_script("a.js"));
        let load = env.insert_script("a.js");
        assert!(env.has_script("a.js"));
        assert_eq!(load.await, Ok(()));
    }

    #[tokio::test]
    async fn test_failing_script() {
        let env = InMemoryEnvironment::new();
        env.fail_script("bad.js");
        let result = env.insert_script("bad.js").await;
        assert_eq!(result, Err(ScriptLoadError::new("bad.js", "load error")));
    }

    #[tokio::test]
    async fn test_deferred_load_waits_for_completion() {
        let env = InMemoryEnvironment::new().with_deferred_scripts();
        let mut load = env.insert_script("a.js");
        assert!(futures::poll!(&mut load).is_pending());
        assert_eq!(env.pending_scripts(), vec!["a.js".to_string()]);

        assert_eq!(env.complete_script("a.js", Ok(())), 1);
        assert_eq!(load.await, Ok(()));
        assert!(env.pending_scripts().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_environment_fails_pending_load() {
        let env = InMemoryEnvironment::new().with_deferred_scripts();
        let load = env.insert_script("a.js");
        drop(env);
        assert!(load.await.is_err());
    }

    #[test]
    fn test_stylesheets() {
        let env = InMemoryEnvironment::new().with_stylesheet("base.css");
        assert!(env.has_stylesheet("base.css"));
        env.insert_stylesheet("menu.css");
        assert_eq!(env.stylesheets(), vec!["base.css".to_string(), "menu.css".to_string()]);
    }
}
