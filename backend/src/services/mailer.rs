use crate::config::Config;

/// Outbound mail boundary. Delivery runs out of process; this records the
/// verification link a relay would send.
pub fn send_verification_email(config: &Config, email: &str, token: &str) {
    log::info!(
        "Verification link for {}: {}/verify-account/{}",
        email,
        config.page_url,
        token
    );
}
