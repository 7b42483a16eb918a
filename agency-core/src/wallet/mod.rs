mod bus;
mod connector;
mod platform;
mod provider;

pub use bus::{AuthBus, AuthEvent, AuthSubscription};
pub use connector::{ConnectOutcome, WalletConnector, CONNECT_FAILED_TEXT, NO_ACCOUNT_TEXT};
pub use platform::{default_user_agent, is_mobile_user_agent, Platform};
pub use provider::{JsonRpcWalletProvider, WalletProvider, USER_REJECTED_CODE};
