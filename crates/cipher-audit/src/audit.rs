//! Reading the currently configured ciphers.

use pan_xapi::{Client, XapiTransport};
use tracing::{debug, info};

use crate::policy::{ConfiguredCiphers, Service};

/// Read the set of ciphers configured on the device for `service`.
///
/// The configured set is derived from the child element names under the
/// service's cipher subtree. An empty or absent subtree is a valid empty
/// set; the device returns one before the ciphers are first configured.
pub async fn configured_ciphers<T: XapiTransport>(
    client: &Client<T>,
    service: Service,
) -> pan_xapi::Result<ConfiguredCiphers> {
    info!(service = %service, "checking ciphers");
    let response = client.config_get(&service.ciphers_xpath()).await?;
    let configured: ConfiguredCiphers = response
        .child_element_names(&["result", service.token()])
        .into_iter()
        .collect();
    debug!(service = %service, configured = configured.len(), "cipher audit complete");
    Ok(configured)
}
