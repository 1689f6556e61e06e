use biometrics::{Collector, Counter, Moments};

pub(crate) static GATEWAY_REQUESTS: Counter = Counter::new("sitebot.gateway.requests");
pub(crate) static GATEWAY_ERRORS: Counter = Counter::new("sitebot.gateway.errors");
pub(crate) static GATEWAY_REQUEST_DURATION: Moments =
    Moments::new("sitebot.gateway.request_duration_seconds");

pub(crate) static CHAT_SENDS: Counter = Counter::new("sitebot.chat.sends");
pub(crate) static CHAT_FALLBACKS: Counter = Counter::new("sitebot.chat.fallbacks");
pub(crate) static CHAT_BUSY_REJECTIONS: Counter = Counter::new("sitebot.chat.busy_rejections");
pub(crate) static CHAT_ACTIVATIONS: Counter = Counter::new("sitebot.chat.activations");

pub(crate) static CONTACT_SUBMISSIONS: Counter = Counter::new("sitebot.contact.submissions");
pub(crate) static CONTACT_ERRORS: Counter = Counter::new("sitebot.contact.errors");

pub(crate) static CATALOG_LOADS: Counter = Counter::new("sitebot.catalog.loads");
pub(crate) static CATALOG_ERRORS: Counter = Counter::new("sitebot.catalog.errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&GATEWAY_REQUESTS);
    collector.register_counter(&GATEWAY_ERRORS);
    collector.register_moments(&GATEWAY_REQUEST_DURATION);

    collector.register_counter(&CHAT_SENDS);
    collector.register_counter(&CHAT_FALLBACKS);
    collector.register_counter(&CHAT_BUSY_REJECTIONS);
    collector.register_counter(&CHAT_ACTIVATIONS);

    collector.register_counter(&CONTACT_SUBMISSIONS);
    collector.register_counter(&CONTACT_ERRORS);

    collector.register_counter(&CATALOG_LOADS);
    collector.register_counter(&CATALOG_ERRORS);
}
