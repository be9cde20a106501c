//! Rate-limit friendly request sending.
//! Native builds retry 429s and transport errors with jittered exponential
//! backoff. Other builds send once and let the caller surface failures.

#[cfg(feature = "native")]
use rand::{thread_rng, Rng};

#[cfg(feature = "native")]
pub async fn send_with_backoff(
    rb: reqwest::RequestBuilder,
    label: &str,
    max_retries: u8,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut attempt = 0u8;
    loop {
        // Streaming bodies cannot be cloned; those get a single attempt.
        let Some(req) = rb.try_clone() else {
            return rb.send().await;
        };
        match req.send().await {
            Ok(r) => {
                if r.status().as_u16() == 429 && attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!("[ecashx][net] 429 {label} retry={attempt} backoff={back_ms}ms");
                    tokio::time::sleep(std::time::Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Ok(r);
            }
            Err(e) => {
                if attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!(
                        "[ecashx][net] err {label} retry={attempt} backoff={back_ms}ms : {e}"
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Err(e);
            }
        }
    }
}

#[cfg(feature = "native")]
fn backoff_delay_ms(attempt: u8) -> u64 {
    base_delay_ms(attempt) + thread_rng().gen_range(0..=250)
}

/// 300, 600, 1200, 2400, 4800 then flat.
pub fn base_delay_ms(attempt: u8) -> u64 {
    300u64.saturating_mul(1u64 << (attempt.clamp(1, 5) - 1))
}

#[cfg(not(feature = "native"))]
pub async fn send_with_backoff(
    rb: reqwest::RequestBuilder,
    label: &str,
    _max_retries: u8,
) -> Result<reqwest::Response, reqwest::Error> {
    log::debug!("[ecashx][net] send {label}");
    rb.send().await
}
