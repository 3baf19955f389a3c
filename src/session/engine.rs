//! Fixed configuration sequence over a [`Channel`]
//!
//! Steps are strictly sequential with at most one command outstanding: the
//! module has no request identifiers, so a reply can only be matched to the
//! command that immediately preceded it.

use crate::core::ConfigurationProfile;
use crate::hardware::Channel;
use crate::processing::{Command, ExchangeOutcome, ResponseParser};
use crate::session::{RunOptions, SessionError, SessionResult, StepKind, StepRecord};
use crate::utils::config::ProfileStore;
use crate::validation::ProfileValidator;
use tracing::{debug, info, warn};

/// Where commands go for this run
enum Link<'a> {
    Device(&'a mut dyn Channel),
    DryRun,
}

struct SessionEngine<'a> {
    link: Link<'a>,
    options: RunOptions,
    parser: ResponseParser,
}

impl<'a> SessionEngine<'a> {
    fn new(channel: Option<&'a mut dyn Channel>, options: &RunOptions) -> Result<Self, SessionError> {
        options.validate()?;

        let link = match (options.dry_run, channel) {
            (true, _) => Link::DryRun,
            (false, Some(channel)) => Link::Device(channel),
            (false, None) => return Err(SessionError::NoChannel),
        };

        Ok(Self {
            link,
            options: options.clone(),
            parser: ResponseParser::new(options.marker_policy),
        })
    }

    /// One write/settle/read/settle cycle, returning the raw reply
    fn transmit(&mut self, command: &Command) -> Result<Vec<u8>, SessionError> {
        let line = command.encode();
        match &mut self.link {
            Link::DryRun => {
                info!("[dry-run] {}", command);
                Ok(Vec::new())
            }
            Link::Device(channel) => {
                debug!("-> {}: {:?}", channel.describe(), line);
                let reply = channel.exchange(
                    line.as_bytes(),
                    self.options.response_capacity,
                    self.options.settle_delay,
                )?;
                debug!("<- {:?}", String::from_utf8_lossy(&reply));
                Ok(reply)
            }
        }
    }

    fn step(&mut self, kind: StepKind, command: Command) -> Result<StepRecord, SessionError> {
        let reply = self.transmit(&command)?;
        let outcome = match self.link {
            Link::DryRun => ExchangeOutcome::Acknowledged,
            Link::Device(_) => self.parser.classify(&reply),
        };

        let record = StepRecord::new(kind, command.body(), &reply, outcome);
        match outcome {
            ExchangeOutcome::Acknowledged => info!("{}: {}", kind, record.status()),
            _ if !kind.is_mandatory() => info!("{}: {}", kind, record.status()),
            ExchangeOutcome::Rejected => {
                warn!("{}: {} (reply {:?})", kind, record.status(), record.reply)
            }
            ExchangeOutcome::Timeout => warn!("{}: {}", kind, record.status()),
        }

        Ok(record)
    }

    fn run(&mut self, profile: &ConfigurationProfile) -> Result<SessionResult, SessionError> {
        let mut result = SessionResult::new(self.options.dry_run);

        let connect = self.step(StepKind::Connect, Command::Connect)?;
        let handshake = connect.outcome;
        result.record(connect);
        if !handshake.is_acknowledged() {
            result.abort_handshake(handshake);
            return Ok(result);
        }

        // Best effort from here on: a failed step is recorded, not fatal
        let steps = [
            (StepKind::SetGroup, Command::set_group(profile)),
            (StepKind::Scan, Command::Scan(profile.scan_frequency)),
            (StepKind::SetVolume, Command::SetVolume(profile.volume)),
            (StepKind::SetFilter, Command::SetFilter(profile.filter)),
        ];
        for (kind, command) in steps {
            let record = self.step(kind, command)?;
            result.record(record);
        }

        result.finalize();
        Ok(result)
    }

    /// Handshake followed by a single query command
    fn query(&mut self, command: Command) -> Result<Option<Vec<u8>>, SessionError> {
        let connect = self.step(StepKind::Connect, Command::Connect)?;
        if !connect.outcome.is_acknowledged() {
            warn!("cannot query {}: {}", command, connect.status());
            return Ok(None);
        }

        let reply = self.transmit(&command)?;
        match self.link {
            Link::DryRun => Ok(None),
            Link::Device(_) => Ok(Some(reply)),
        }
    }
}

/// Run the configuration sequence for `profile`.
///
/// `channel` may be `None` only in dry-run mode, where the channel is never
/// touched and every step is reported as acknowledged. A rejected or
/// unanswered handshake ends the session immediately; later steps are all
/// attempted and their outcomes aggregated.
pub fn run_session(
    channel: Option<&mut dyn Channel>,
    profile: &ConfigurationProfile,
    options: &RunOptions,
) -> Result<SessionResult, SessionError> {
    ProfileValidator::new().validate(profile)?;

    let mut engine = SessionEngine::new(channel, options)?;
    let result = engine.run(profile)?;

    match result.failure() {
        None => info!("session complete: all steps acknowledged"),
        Some(reason) => warn!("session failed: {}", reason),
    }
    Ok(result)
}

/// Run a session and persist `profile` to `store` only if it fully succeeded.
///
/// Dry runs never persist since nothing reached the module.
pub fn apply_profile(
    channel: Option<&mut dyn Channel>,
    profile: &ConfigurationProfile,
    options: &RunOptions,
    store: &mut dyn ProfileStore,
) -> Result<SessionResult, SessionError> {
    let result = run_session(channel, profile, options)?;

    if result.overall_success() && !result.is_dry_run() {
        store.save(profile)?;
        info!("saved applied profile to {}", store.location());
    }

    Ok(result)
}

/// Read the received signal strength; `None` if the module did not answer
pub fn query_rssi(
    channel: Option<&mut dyn Channel>,
    options: &RunOptions,
) -> Result<Option<u8>, SessionError> {
    let mut engine = SessionEngine::new(channel, options)?;
    let Some(reply) = engine.query(Command::ReadRssi)? else {
        return Ok(None);
    };

    match engine.parser.parse_rssi(&reply) {
        Ok(rssi) => Ok(Some(rssi)),
        Err(e) => {
            warn!("unusable RSSI reply: {}", e);
            Ok(None)
        }
    }
}

/// Read the firmware version string; `None` if the module did not answer
pub fn query_version(
    channel: Option<&mut dyn Channel>,
    options: &RunOptions,
) -> Result<Option<String>, SessionError> {
    let mut engine = SessionEngine::new(channel, options)?;
    let Some(reply) = engine.query(Command::ReadVersion)? else {
        return Ok(None);
    };

    match engine.parser.parse_version(&reply) {
        Ok(version) => Ok(Some(version)),
        Err(e) => {
            warn!("unusable version reply: {}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{CommError, MockChannel};
    use crate::processing::MarkerPolicy;
    use crate::session::FailureReason;
    use crate::utils::config::ConfigError;
    use std::time::Duration;

    fn fast_options() -> RunOptions {
        RunOptions::default().with_settle_delay(Duration::ZERO)
    }

    /// Store that only counts saves
    #[derive(Default)]
    struct CountingStore {
        saved: Vec<ConfigurationProfile>,
    }

    impl ProfileStore for CountingStore {
        fn load(&self) -> Result<ConfigurationProfile, ConfigError> {
            Ok(ConfigurationProfile::default())
        }

        fn save(&mut self, profile: &ConfigurationProfile) -> Result<(), ConfigError> {
            self.saved.push(profile.clone());
            Ok(())
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    #[test]
    fn test_reference_profile_succeeds() {
        let mut channel = MockChannel::new();
        let profile = ConfigurationProfile::default();

        let result = run_session(Some(&mut channel), &profile, &fast_options()).unwrap();

        assert!(result.overall_success());
        assert_eq!(result.steps().len(), 5);
        assert_eq!(
            result
                .steps()
                .iter()
                .filter(|s| s.kind.is_mandatory() && s.outcome.is_acknowledged())
                .count(),
            4
        );
        assert_eq!(result.channel_found(), Some(true));
        assert_eq!(
            channel.sent_commands(),
            vec![
                "AT+DMOCONNECT\r\n",
                "AT+DMOSETGROUP=0,150.0000,150.0000,0000,8,0000\r\n",
                "S+150.0000\r\n",
                "AT+DMOSETVOLUME=8\r\n",
                "AT+SETFILTER=0,0,0\r\n",
            ]
        );
    }

    #[test]
    fn test_rejected_handshake_aborts() {
        let mut channel = MockChannel::new();
        channel.push_reply("+DMOCONNECT:1\r\n");

        let result =
            run_session(Some(&mut channel), &ConfigurationProfile::default(), &fast_options())
                .unwrap();

        assert!(!result.overall_success());
        assert_eq!(
            result.failure(),
            Some(&FailureReason::HandshakeFailed {
                outcome: ExchangeOutcome::Rejected
            })
        );
        assert_eq!(result.steps().len(), 1);
        assert_eq!(channel.get_sent_messages().len(), 1);
    }

    #[test]
    fn test_silent_handshake_aborts() {
        let mut channel = MockChannel::silent();

        let result =
            run_session(Some(&mut channel), &ConfigurationProfile::default(), &fast_options())
                .unwrap();

        assert_eq!(
            result.failure(),
            Some(&FailureReason::HandshakeFailed {
                outcome: ExchangeOutcome::Timeout
            })
        );
        assert_eq!(channel.get_sent_messages().len(), 1);
    }

    #[test]
    fn test_rejected_volume_still_sets_filter() {
        let mut channel = MockChannel::new();
        channel
            .push_reply("+DMOCONNECT:0\r\n")
            .push_reply("+DMOSETGROUP:0\r\n")
            .push_reply("S=0\r\n")
            .push_reply("+DMOSETVOLUME:1\r\n");

        let result =
            run_session(Some(&mut channel), &ConfigurationProfile::default(), &fast_options())
                .unwrap();

        assert!(!result.overall_success());
        assert_eq!(
            result.step(StepKind::SetVolume).unwrap().outcome,
            ExchangeOutcome::Rejected
        );
        assert_eq!(
            result.step(StepKind::SetFilter).unwrap().outcome,
            ExchangeOutcome::Acknowledged
        );
        assert_eq!(channel.get_sent_messages().len(), 5);
    }

    #[test]
    fn test_unresponsive_step_is_distinct_from_rejection() {
        let mut channel = MockChannel::new();
        channel.push_reply("+DMOCONNECT:0\r\n").push_silence();

        let result =
            run_session(Some(&mut channel), &ConfigurationProfile::default(), &fast_options())
                .unwrap();

        let group = result.step(StepKind::SetGroup).unwrap();
        assert_eq!(group.outcome, ExchangeOutcome::Timeout);
        assert_eq!(group.status(), "device unresponsive");
        assert!(!result.overall_success());
    }

    #[test]
    fn test_scan_outcome_is_advisory() {
        let cases = [
            (Some("S=0\r\n"), "channel found", Some(true)),
            (Some("S=1\r\n"), "channel not found", Some(false)),
            (None, "no scan reply", Some(false)),
        ];

        for (scan_reply, status, found) in cases {
            let mut channel = MockChannel::new();
            channel
                .push_reply("+DMOCONNECT:0\r\n")
                .push_reply("+DMOSETGROUP:0\r\n");
            match scan_reply {
                Some(reply) => channel.push_reply(reply),
                None => channel.push_silence(),
            };

            let result =
                run_session(Some(&mut channel), &ConfigurationProfile::default(), &fast_options())
                    .unwrap();
            assert!(result.overall_success(), "scan reply {:?}", scan_reply);
            assert!(result.failure().is_none());
            assert_eq!(result.channel_found(), found);

            let scan = result.step(StepKind::Scan).unwrap();
            assert_eq!(scan.status(), status);
            assert_eq!(channel.sent_commands().len(), 5);
        }
    }

    #[test]
    fn test_dry_run_never_touches_channel() {
        let mut channel = MockChannel::new();
        let options = RunOptions::dry_run().with_settle_delay(Duration::ZERO);

        let result =
            run_session(Some(&mut channel), &ConfigurationProfile::default(), &options).unwrap();

        assert!(channel.get_sent_messages().is_empty());
        assert!(result.is_dry_run());
        assert!(result.overall_success());
        assert!(result
            .steps()
            .iter()
            .all(|s| s.outcome == ExchangeOutcome::Acknowledged));
        assert_eq!(result.commands()[0], "AT+DMOCONNECT");
        assert_eq!(result.commands()[4], "AT+SETFILTER=0,0,0");
    }

    #[test]
    fn test_dry_run_without_channel() {
        let result = run_session(
            None,
            &ConfigurationProfile::default(),
            &RunOptions::dry_run(),
        )
        .unwrap();
        assert!(result.overall_success());
    }

    #[test]
    fn test_live_run_requires_channel() {
        let result = run_session(None, &ConfigurationProfile::default(), &fast_options());
        assert!(matches!(result, Err(SessionError::NoChannel)));
    }

    #[test]
    fn test_invalid_profile_sends_nothing() {
        let mut channel = MockChannel::new();
        let profile = ConfigurationProfile {
            volume: 9,
            ..Default::default()
        };

        let result = run_session(Some(&mut channel), &profile, &fast_options());
        assert!(matches!(result, Err(SessionError::Validation(_))));
        assert!(channel.get_sent_messages().is_empty());
    }

    #[test]
    fn test_io_failure_is_fatal() {
        let mut channel = MockChannel::new();
        channel.push_reply("+DMOCONNECT:0\r\n").push_failure("unplugged");

        let result =
            run_session(Some(&mut channel), &ConfigurationProfile::default(), &fast_options());
        assert!(matches!(result, Err(SessionError::Comm(CommError::Io { .. }))));
    }

    #[test]
    fn test_lenient_policy_accepts_echo() {
        let mut channel = MockChannel::new();
        channel
            .push_reply("+DMOCONNECT:0\r\n")
            .push_reply("AT+DMOSETGROUP=0,150.0000,150.0000,0000,8,0000\r\n");

        let strict =
            run_session(Some(&mut channel), &ConfigurationProfile::default(), &fast_options())
                .unwrap();
        assert!(!strict.overall_success());

        let mut channel = MockChannel::new();
        channel
            .push_reply("+DMOCONNECT:0\r\n")
            .push_reply("AT+DMOSETGROUP=0,150.0000,150.0000,0000,8,0000\r\n");
        let lenient_options = fast_options().with_marker_policy(MarkerPolicy::Lenient);
        let lenient =
            run_session(Some(&mut channel), &ConfigurationProfile::default(), &lenient_options)
                .unwrap();
        assert!(lenient.overall_success());
    }

    #[test]
    fn test_persists_once_on_success() {
        let mut channel = MockChannel::new();
        let mut store = CountingStore::default();
        let profile = ConfigurationProfile {
            volume: 5,
            ..Default::default()
        };

        let result = apply_profile(Some(&mut channel), &profile, &fast_options(), &mut store).unwrap();

        assert!(result.overall_success());
        assert_eq!(store.saved, vec![profile]);
    }

    #[test]
    fn test_no_persistence_on_failure() {
        let mut channel = MockChannel::new();
        channel
            .push_reply("+DMOCONNECT:0\r\n")
            .push_reply("+DMOSETGROUP:1\r\n");
        let mut store = CountingStore::default();

        let result = apply_profile(
            Some(&mut channel),
            &ConfigurationProfile::default(),
            &fast_options(),
            &mut store,
        )
        .unwrap();

        assert!(!result.overall_success());
        assert!(store.saved.is_empty());
    }

    #[test]
    fn test_no_persistence_on_dry_run() {
        let mut store = CountingStore::default();
        let result = apply_profile(
            None,
            &ConfigurationProfile::default(),
            &RunOptions::dry_run(),
            &mut store,
        )
        .unwrap();

        assert!(result.overall_success());
        assert!(store.saved.is_empty());
    }

    #[test]
    fn test_queries() {
        let mut channel = MockChannel::new();
        channel.set_rssi(87);
        channel.set_firmware_version("SA818S_V5.0");

        assert_eq!(query_rssi(Some(&mut channel), &fast_options()).unwrap(), Some(87));
        assert_eq!(
            query_version(Some(&mut channel), &fast_options()).unwrap(),
            Some("SA818S_V5.0".to_string())
        );
        assert_eq!(
            channel.sent_commands(),
            vec!["AT+DMOCONNECT\r\n", "RSSI?\r\n", "AT+DMOCONNECT\r\n", "AT+VERSION\r\n"]
        );
    }

    #[test]
    fn test_query_without_handshake() {
        let mut channel = MockChannel::silent();
        assert_eq!(query_rssi(Some(&mut channel), &fast_options()).unwrap(), None);
        assert_eq!(channel.get_sent_messages().len(), 1);
    }
}
