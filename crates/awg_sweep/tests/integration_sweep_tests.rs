mod support;

use awg_sweep::{
    ArtifactSlot, FailureReason, ParameterSpace, ShutdownFlag, SweepError, SweepPlan,
    SweepRunner, TunnelTemplate,
};
use support::probe::{ProbeBehaviour, StubProbe};
use support::tunnel::StubTunnel;
use support::{client_template, event_log, events, quiet_settings};
use tempfile::tempdir;

fn example_space() -> ParameterSpace {
    ParameterSpace::grid()
        .jc(vec![0, 3])
        .jmin(vec![40])
        .jmax(vec![100])
        .s1(vec![0])
        .s2(vec![0])
        .h1(vec![11])
        .h2(vec![22])
        .h3(vec![33])
        .h4(vec![44])
}

fn wide_space() -> ParameterSpace {
    ParameterSpace::grid()
        .jc(vec![0, 3, 5])
        .jmin(vec![40, 50])
        .jmax(vec![70, 100])
        .s1(vec![0, 15])
}

#[test]
fn report_covers_every_combination() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone());
    let probe = StubProbe::new(log.clone(), ProbeBehaviour::Latency(20.0));
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), wide_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    assert_eq!(report.len(), 3 * 2 * 2 * 2);
    assert!(!report.interrupted);
    assert!(report.finished_at.is_some());
}

#[test]
fn enumeration_order_is_identical_across_runs() {
    let dir = tempdir().unwrap();
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), wide_space().generate());

    let run = || {
        let log = event_log();
        let tunnel = StubTunnel::new(log.clone());
        let probe = StubProbe::new(log, ProbeBehaviour::Latency(20.0));
        let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));
        SweepRunner::new(&tunnel, &probe, &settings)
            .run(&plan, &mut artifact)
            .unwrap()
            .records
            .into_iter()
            .map(|record| record.set.params)
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(first[0].jc, 0);
    assert_eq!(first.last().unwrap().jc, 5);
}

#[test]
fn two_combination_example_runs_up_probe_down_in_order() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone());
    let probe = StubProbe::new(log.clone(), ProbeBehaviour::Latency(12.0));
    let mut settings = quiet_settings();
    settings.check_handshake = false;
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report.records[0].set.params.jc, 0);
    assert_eq!(report.records[1].set.params.jc, 3);
    assert_eq!(
        events(&log),
        vec![
            "up",
            "probe 1.1.1.1 x5",
            "down",
            "up",
            "probe 1.1.1.1 x5",
            "down"
        ]
    );
}

#[test]
fn fixed_latency_makes_every_combination_succeed() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone());
    let probe = StubProbe::new(log, ProbeBehaviour::Latency(37.25));
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), wide_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    assert_eq!(report.success_count(), report.len());
    let best = report.best().unwrap();
    assert_eq!(best.result.avg_latency_ms(), Some(37.25));
    assert_eq!(best.set.index, 0);
}

#[test]
fn fastest_combination_is_reported_best() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone());
    let probe = StubProbe::new(
        log,
        ProbeBehaviour::Increasing {
            base: 80.0,
            step: -10.0,
        },
    );
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    let best = report.best().unwrap();
    assert_eq!(best.set.params.jc, 3);
    assert_eq!(best.result.avg_latency_ms(), Some(70.0));
}

#[test]
fn total_loss_yields_no_best_without_error() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone());
    let probe = StubProbe::new(log, ProbeBehaviour::TotalLoss);
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    assert_eq!(report.success_count(), 0);
    assert!(report.best().is_none());
    assert!(report
        .records
        .iter()
        .all(|record| record.result.failure == Some(FailureReason::Unreachable)));
}

#[test]
fn probe_timeout_is_a_failed_combination() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone());
    let probe = StubProbe::new(log, ProbeBehaviour::Timeout);
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(
        report.records[0].result.failure,
        Some(FailureReason::ProbeTimeout)
    );
}

#[test]
fn refused_activation_skips_probe_but_still_tears_down() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let mut tunnel = StubTunnel::new(log.clone());
    tunnel.refuse_up = vec![0];
    let probe = StubProbe::new(log.clone(), ProbeBehaviour::Latency(10.0));
    let mut settings = quiet_settings();
    settings.check_handshake = false;
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    assert_eq!(
        events(&log),
        vec!["up", "down", "up", "probe 1.1.1.1 x5", "down"]
    );
    let failed = &report.records[0].result;
    assert_eq!(failed.failure, Some(FailureReason::ActivationFailed));
    assert!(failed.rtt.is_none());
    assert!(failed.error.as_deref().unwrap().contains("Invalid argument"));
    assert!(report.records[1].result.success);
}

#[test]
fn missing_handshake_is_recorded_without_probing() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let mut tunnel = StubTunnel::new(log.clone());
    tunnel.handshake = false;
    let probe = StubProbe::new(log.clone(), ProbeBehaviour::Latency(10.0));
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    assert_eq!(
        events(&log),
        vec!["up", "show", "down", "up", "show", "down"]
    );
    for record in &report.records {
        assert_eq!(record.result.failure, Some(FailureReason::NoHandshake));
        assert!(record.result.activated);
        assert_eq!(record.result.handshake, Some(false));
    }
}

#[test]
fn interface_already_down_is_not_fatal() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let mut tunnel = StubTunnel::new(log.clone());
    tunnel.already_down = true;
    let probe = StubProbe::new(log, ProbeBehaviour::Latency(10.0));
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    assert_eq!(report.success_count(), 2);
}

#[test]
fn fatal_activation_error_aborts_after_teardown() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let mut tunnel = StubTunnel::new(log.clone());
    tunnel.fatal_up = Some(1);
    let probe = StubProbe::new(log.clone(), ProbeBehaviour::Latency(10.0));
    let mut settings = quiet_settings();
    settings.check_handshake = false;
    let plan = SweepPlan::single(client_template(), wide_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let result = SweepRunner::new(&tunnel, &probe, &settings).run(&plan, &mut artifact);

    assert!(matches!(result, Err(SweepError::UnsupportedTool { .. })));
    assert_eq!(
        events(&log),
        vec!["up", "probe 1.1.1.1 x5", "down", "up", "down"]
    );
}

#[test]
fn fatal_probe_error_still_tears_tunnel_down() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone());
    let mut probe = StubProbe::new(log.clone(), ProbeBehaviour::Latency(10.0));
    probe.fatal_at = Some(0);
    let mut settings = quiet_settings();
    settings.check_handshake = false;
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let result = SweepRunner::new(&tunnel, &probe, &settings).run(&plan, &mut artifact);

    assert!(matches!(result, Err(SweepError::ToolMissing(ref tool)) if tool == "ping"));
    assert_eq!(events(&log), vec!["up", "probe 1.1.1.1 x5", "down"]);
}

#[test]
fn interrupt_stops_after_current_combination() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let flag = ShutdownFlag::manual();
    let tunnel = StubTunnel::new(log.clone());
    let mut probe = StubProbe::new(log.clone(), ProbeBehaviour::Latency(10.0));
    probe.interrupt_at = Some((1, flag.clone()));
    let mut settings = quiet_settings();
    settings.check_handshake = false;
    let plan = SweepPlan::single(client_template(), wide_space().generate());
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .with_shutdown(&flag)
        .run(&plan, &mut artifact)
        .unwrap();

    assert!(report.interrupted);
    assert_eq!(report.len(), 2);
    assert_eq!(events(&log).last().map(String::as_str), Some("down"));
    assert_eq!(events(&log).iter().filter(|event| *event == "up").count(), 2);
}

#[test]
fn artifact_holds_rendered_config_during_activation_and_is_removed_after() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("awg-test.conf");
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone()).watching(path.clone());
    let probe = StubProbe::new(log, ProbeBehaviour::Latency(10.0));
    let settings = quiet_settings();
    let plan = SweepPlan::single(client_template(), example_space().generate());
    let mut artifact = ArtifactSlot::new(&path);

    SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    let seen = tunnel.seen_configs.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].contains("Jc = 0"));
    assert!(seen[1].contains("Jc = 3"));
    assert!(seen[1].contains("Jmax = 100"));
    assert!(seen[1].contains("H1 = 11"));
    assert!(seen[1].contains("Endpoint = vpn.example.net:51820"));
    assert!(!path.exists());
}

#[test]
fn every_template_gets_the_full_grid() {
    let dir = tempdir().unwrap();
    let log = event_log();
    let tunnel = StubTunnel::new(log.clone());
    let probe = StubProbe::new(log, ProbeBehaviour::Latency(10.0));
    let settings = quiet_settings();

    let mut plan = SweepPlan::new();
    for name in ["alpha", "beta"] {
        let template = TunnelTemplate::parse(name, support::CLIENT_TEMPLATE).unwrap();
        plan.push(template, example_space().generate());
    }
    let mut artifact = ArtifactSlot::new(dir.path().join("awg-test.conf"));

    let report = SweepRunner::new(&tunnel, &probe, &settings)
        .run(&plan, &mut artifact)
        .unwrap();

    let templates: Vec<&str> = report
        .records
        .iter()
        .map(|record| record.template.as_str())
        .collect();
    assert_eq!(templates, vec!["alpha", "alpha", "beta", "beta"]);
}
