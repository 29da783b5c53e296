//! Host list resolution.
//!
//! Every configured selector is sent to the registry in order and the returned
//! names are appended to one ordered set. A name seen under an earlier
//! selector keeps its position; later duplicates are dropped silently.

use tracing::debug;

use super::OrderedSet;
use crate::error::Result;
use crate::registry::RegistryClient;

/// Resolve `selectors` into the de-duplicated host list for the `all` group.
///
/// The first failing request aborts resolution; no partial list is returned.
pub fn resolve_hosts<C, S>(client: &C, selectors: &[S]) -> Result<OrderedSet<String>>
where
    C: RegistryClient + ?Sized,
    S: AsRef<str>,
{
    let mut all = OrderedSet::new();

    for selector in selectors {
        let selector = selector.as_ref();
        let hosts = client.fetch_hosts_for_selector(selector)?;
        let returned = hosts.len();

        let added = hosts.into_iter().filter(|host| all.push(host.clone())).count();
        debug!(
            selector = %selector,
            returned,
            added,
            total = all.len(),
            "resolved selector"
        );
    }

    Ok(all)
}
