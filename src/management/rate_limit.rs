use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::Utc;

use crate::{
    error::{JukeboxError, Result},
    types::RateLimitRecord,
};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Blocked { retry_after: u64 },
}

/// Fixed-window counter limiting how often a device may submit requests.
///
/// One record per device: the count resets once the window has elapsed, and
/// exceeding the ceiling blocks the device until the window would have
/// ended. This is a fixed-window approximation, not a true sliding log, so
/// a device can burst around a window boundary; acceptable for an
/// abuse-deterrence control. Denied calls while blocked do not touch the
/// counter.
pub struct RateLimiter {
    dir: PathBuf,
    max_per_window: u32,
    window_secs: i64,
    records: HashMap<String, RateLimitRecord>,
}

impl RateLimiter {
    pub async fn open(dir: &Path, max_per_window: u32, window_secs: i64) -> Result<Self> {
        let path = dir.join("rate_limits.json");
        let records = match async_fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(JukeboxError::Storage(e)),
        };

        Ok(RateLimiter {
            dir: dir.to_path_buf(),
            max_per_window,
            window_secs,
            records,
        })
    }

    pub async fn check_and_consume(
        &mut self,
        device_id: &str,
        ip_address: &str,
    ) -> Result<RateDecision> {
        self.check_and_consume_at(device_id, ip_address, Utc::now().timestamp())
            .await
    }

    /// Clock-injected variant of [`check_and_consume`](Self::check_and_consume).
    pub async fn check_and_consume_at(
        &mut self,
        device_id: &str,
        ip_address: &str,
        now: i64,
    ) -> Result<RateDecision> {
        let decision = self.evaluate(device_id, ip_address, now);
        self.persist().await?;
        Ok(decision)
    }

    fn evaluate(&mut self, device_id: &str, ip_address: &str, now: i64) -> RateDecision {
        let record = match self.records.get_mut(device_id) {
            Some(record) => record,
            None => {
                self.records.insert(
                    device_id.to_string(),
                    RateLimitRecord {
                        device_id: device_id.to_string(),
                        ip_address: ip_address.to_string(),
                        window_count: 1,
                        window_started_at: now,
                        blocked_until: None,
                    },
                );
                return RateDecision::Allowed;
            }
        };

        record.ip_address = ip_address.to_string();

        if let Some(blocked_until) = record.blocked_until {
            if now < blocked_until {
                return RateDecision::Blocked {
                    retry_after: (blocked_until - now).max(1) as u64,
                };
            }
        }

        if now - record.window_started_at >= self.window_secs {
            record.window_count = 1;
            record.window_started_at = now;
            record.blocked_until = None;
            return RateDecision::Allowed;
        }

        record.window_count += 1;
        if record.window_count > self.max_per_window {
            let blocked_until = record.window_started_at + self.window_secs;
            record.blocked_until = Some(blocked_until);
            return RateDecision::Blocked {
                retry_after: (blocked_until - now).max(1) as u64,
            };
        }

        RateDecision::Allowed
    }

    pub fn record(&self, device_id: &str) -> Option<&RateLimitRecord> {
        self.records.get(device_id)
    }

    async fn persist(&self) -> Result<()> {
        let path = self.get_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.records)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    fn get_path(&self) -> PathBuf {
        self.dir.join("rate_limits.json")
    }
}
