use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A wait bound that can be switched off entirely.
///
/// Mirrors the `number | false` options hosts are configured with:
/// `Disabled` waits forever, `After` bounds the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Never time out.
    #[default]
    Disabled,
    /// Give up after the given duration.
    After(Duration),
}

impl Timeout {
    /// Bound in milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self::After(Duration::from_millis(millis))
    }

    /// The bound, if one is enforced.
    pub fn as_duration(self) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::After(duration) => Some(duration),
        }
    }

    pub fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Self::After(duration)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(duration: Option<Duration>) -> Self {
        duration.map_or(Self::Disabled, Self::After)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "off"),
            Self::After(duration) => write!(f, "{}ms", duration.as_millis()),
        }
    }
}

/// Error returned when a timeout string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timeout '{0}' (expected off, <n>ms or <n>s)")]
pub struct ParseTimeoutError(String);

impl FromStr for Timeout {
    type Err = ParseTimeoutError;

    /// Accepts `off`/`false`, `<n>ms`, `<n>s` or a bare number of seconds.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("off") || input.eq_ignore_ascii_case("false") {
            return Ok(Self::Disabled);
        }

        let (number, to_duration): (&str, fn(u64) -> Duration) =
            if let Some(num) = input.strip_suffix("ms") {
                (num, Duration::from_millis)
            } else if let Some(num) = input.strip_suffix('s') {
                (num, Duration::from_secs)
            } else {
                (input, Duration::from_secs)
            };

        let value: u64 = number
            .parse()
            .map_err(|_| ParseTimeoutError(input.to_string()))?;
        if value == 0 {
            return Err(ParseTimeoutError(input.to_string()));
        }

        Ok(Self::After(to_duration(value)))
    }
}

/// Configuration handed to the transport when the channel is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionConfig {
    /// Bound on the wait for `mc-connected`.
    pub connection_timeout: Timeout,
    /// Default bound for requests that do not override it.
    pub timeout: Timeout,
    /// Log every message crossing the channel.
    pub debug: bool,
}

/// Per-request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestOptions {
    /// Overrides the connection's default request timeout when set.
    pub timeout: Option<Timeout>,
}

impl RequestOptions {
    /// Wait for the reply however long it takes.
    pub fn no_timeout() -> Self {
        Self {
            timeout: Some(Timeout::Disabled),
        }
    }

    pub fn with_timeout(timeout: Timeout) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// The timeout that applies given the connection's default.
    pub fn effective_timeout(&self, default: Timeout) -> Timeout {
        self.timeout.unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_and_millis() {
        assert_eq!(
            "2s".parse::<Timeout>().unwrap(),
            Timeout::After(Duration::from_secs(2))
        );
        assert_eq!("150ms".parse::<Timeout>().unwrap(), Timeout::from_millis(150));
        assert_eq!(
            "3".parse::<Timeout>().unwrap(),
            Timeout::After(Duration::from_secs(3))
        );
    }

    #[test]
    fn parse_disabled_spellings() {
        assert_eq!("off".parse::<Timeout>().unwrap(), Timeout::Disabled);
        assert_eq!("false".parse::<Timeout>().unwrap(), Timeout::Disabled);
        assert_eq!("OFF".parse::<Timeout>().unwrap(), Timeout::Disabled);
    }

    #[test]
    fn parse_rejects_invalid_values() {
        assert!("0s".parse::<Timeout>().is_err());
        assert!("bad".parse::<Timeout>().is_err());
        assert!("".parse::<Timeout>().is_err());
    }

    #[test]
    fn request_override_wins_over_default() {
        let default = Timeout::from_millis(500);
        assert_eq!(RequestOptions::default().effective_timeout(default), default);
        assert_eq!(
            RequestOptions::no_timeout().effective_timeout(default),
            Timeout::Disabled
        );
        assert_eq!(
            RequestOptions::with_timeout(Timeout::from_millis(10)).effective_timeout(default),
            Timeout::from_millis(10)
        );
    }

    #[test]
    fn defaults_enforce_nothing() {
        let config = ConnectionConfig::default();
        assert!(config.connection_timeout.is_disabled());
        assert!(config.timeout.is_disabled());
        assert!(!config.debug);
    }

    #[test]
    fn display_round_trips_through_parse() {
        let timeout = Timeout::from_millis(250);
        assert_eq!(timeout.to_string().parse::<Timeout>().unwrap(), timeout);
        assert_eq!(Timeout::Disabled.to_string(), "off");
    }
}
