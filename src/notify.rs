pub mod policy;
pub use policy::NotificationPolicy;
pub mod queue;
pub use queue::NotificationQueue;
pub mod webhook;
pub use webhook::{DisabledNotifier, NotificationSink, NotifyError, WebhookNotifier};
