//! Outbound controls for the wallet-connection session: connect UI,
//! disconnect and chain switch.

use async_trait::async_trait;

use crate::error::ActionError;
use crate::network::Chain;

#[async_trait(?Send)]
pub trait SessionControl {
    /// Open the connect UI. Fire-and-forget.
    fn open(&self);

    /// End the wallet session. Fire-and-forget; the session reports the
    /// cleared account back through the usual account event.
    fn disconnect(&self);

    /// Ask the session to move the wallet to `chain`.
    async fn switch_network(&self, chain: &Chain) -> Result<(), ActionError>;
}
