//! Contract Test: create
//!
//! Constraints verified:
//! - A new record lands in the zone file and the zone is submitted once
//! - Creating an existing record is a no-op without a submit
//! - Missing type/name/content fails before touching the zone
//! - A rejected submit surfaces as an error
//! - The propagation outcome is reported, not enforced
//! - With concatenation the record is written at the CNAME tip

mod common;

use common::*;
use std::sync::Arc;
use zonesync_core::{
    Action, ActionOutcome, Error, Propagation, RecordChange, RecordProvider, RecordRequest,
};

fn create_txt(content: &str) -> RecordRequest {
    RecordRequest::new(Action::Create, "example.com")
        .with_type("TXT")
        .with_name("_acme-challenge.example.com")
        .with_content(content)
}

#[tokio::test]
async fn create_adds_record_and_submits_zone() {
    let robot = FakeRobot::new();
    let provider = provider(&robot);

    let outcome = provider.execute(&create_txt("abc123")).await.unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Changed(RecordChange::Created {
            propagation: Propagation::Skipped
        })
    );
    let zonefile = robot.zonefile(EXAMPLE_COM_ID);
    assert!(zonefile.contains("_acme-challenge 3600 IN TXT \"abc123\"\n"), "{}", zonefile);
    assert_eq!(robot.submissions(), 1);
}

#[tokio::test]
async fn create_keeps_the_rest_of_the_zone() {
    let robot = FakeRobot::new();
    let provider = provider(&robot);

    provider.execute(&create_txt("abc123")).await.unwrap();

    let zonefile = robot.zonefile(EXAMPLE_COM_ID);
    for line in [
        "@ 86400 IN SOA ns1.first-ns.de. postmaster.robot.first-ns.de. 2024010101 14400 1800 604800 86400\n",
        "@ 86400 IN NS ns1.first-ns.de.\n",
        "@ 86400 IN NS robotns2.second-ns.de.\n",
        "www 86400 IN A 192.0.2.10\n",
        "@ 86400 IN MX 10 mail\n",
    ] {
        assert!(zonefile.contains(line), "missing {:?} in\n{}", line, zonefile);
    }
}

#[tokio::test]
async fn create_twice_is_idempotent() {
    let robot = FakeRobot::new();
    let provider = provider(&robot);

    provider.execute(&create_txt("abc123")).await.unwrap();
    let second = provider.execute(&create_txt("abc123")).await.unwrap();

    assert_eq!(second, ActionOutcome::Changed(RecordChange::Unchanged));
    assert_eq!(robot.submissions(), 1);
    assert_eq!(
        robot.zonefile(EXAMPLE_COM_ID).matches("\"abc123\"").count(),
        1
    );
}

#[tokio::test]
async fn create_treats_quoted_and_raw_content_alike() {
    let robot = FakeRobot::new();
    let provider = provider(&robot);

    provider.execute(&create_txt("abc123")).await.unwrap();
    let second = provider.execute(&create_txt("\"abc123\"")).await.unwrap();

    assert_eq!(second, ActionOutcome::Changed(RecordChange::Unchanged));
}

#[tokio::test]
async fn create_without_content_is_rejected() {
    let robot = FakeRobot::new();
    let provider = provider(&robot);
    let request = RecordRequest::new(Action::Create, "example.com")
        .with_type("TXT")
        .with_name("_acme-challenge");

    let err = provider.execute(&request).await.unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(robot.submissions(), 0);
    assert_eq!(robot.logouts(), 1);
}

#[tokio::test]
async fn rejected_submission_is_an_error() {
    let robot = FakeRobot::new().rejecting_submissions();
    let provider = provider(&robot);

    let err = provider.execute(&create_txt("abc123")).await.unwrap_err();

    assert!(matches!(
        err,
        Error::SubmissionRejected {
            zone_id: EXAMPLE_COM_ID
        }
    ));
    assert!(!robot.zonefile(EXAMPLE_COM_ID).contains("abc123"));
    assert_eq!(robot.logouts(), 1);
}

#[tokio::test]
async fn german_confirmation_is_recognized() {
    let robot = FakeRobot::new().with_language("de_DE");
    let provider = provider(&robot);

    let outcome = provider.execute(&create_txt("abc123")).await.unwrap();

    assert!(matches!(
        outcome,
        ActionOutcome::Changed(RecordChange::Created { .. })
    ));
}

#[tokio::test]
async fn unsupported_language_fails_the_submit() {
    let robot = FakeRobot::new().with_language("fr_FR");
    let provider = provider(&robot);

    let err = provider.execute(&create_txt("abc123")).await.unwrap_err();

    assert!(matches!(err, Error::PageModel(_)));
    assert_eq!(robot.submissions(), 0);
    assert_eq!(robot.logouts(), 1);
}

#[tokio::test]
async fn propagation_is_confirmed_when_visible() {
    let robot = FakeRobot::new();
    let lookup = Arc::new(ScriptedLookup::new().answer(
        "_acme-challenge.example.com.",
        "TXT",
        &["\"abc123\""],
    ));
    let mut config = config();
    config.provider.propagated = true;
    let provider = provider_with(&robot, config, lookup.clone());

    let outcome = provider.execute(&create_txt("abc123")).await.unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Changed(RecordChange::Created {
            propagation: Propagation::Confirmed
        })
    );
    assert_eq!(lookup.query_count("TXT"), 1);
}

#[tokio::test]
async fn missing_propagation_does_not_fail_create() {
    let robot = FakeRobot::new();
    let lookup = Arc::new(ScriptedLookup::new());
    let mut config = config();
    config.provider.propagated = true;
    let provider = provider_with(&robot, config, lookup.clone());

    let outcome = provider.execute(&create_txt("abc123")).await.unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::Changed(RecordChange::Created {
            propagation: Propagation::NotConfirmed
        })
    );
    assert_eq!(lookup.query_count("TXT"), 20);
    assert!(robot.zonefile(EXAMPLE_COM_ID).contains("\"abc123\""));
}

#[tokio::test]
async fn create_follows_cname_into_target_zone() {
    let robot = FakeRobot::new().with_zone(2002, "example.org", "$TTL 3600\n@ IN A 192.0.2.50\n");
    let lookup = Arc::new(
        ScriptedLookup::new()
            .answer(
                "_acme-challenge.example.com.",
                "CNAME",
                &["_acme-challenge.example.org."],
            )
            .answer(
                "example.org.",
                "SOA",
                &["ns1.example.org. hostmaster.example.org. 1 7200 3600 1209600 3600"],
            )
            .answer("ns1.example.org.", "A", &["198.51.100.53"]),
    );
    let provider = provider_with(&robot, config(), lookup);

    provider.execute(&create_txt("abc123")).await.unwrap();

    assert!(robot
        .zonefile(2002)
        .contains("_acme-challenge 3600 IN TXT \"abc123\"\n"));
    assert_eq!(robot.zonefile(EXAMPLE_COM_ID), EXAMPLE_COM);
}

#[tokio::test]
async fn create_without_concatenation_ignores_cname() {
    let robot = FakeRobot::new();
    let lookup = Arc::new(ScriptedLookup::new().answer(
        "_acme-challenge.example.com.",
        "CNAME",
        &["_acme-challenge.example.org."],
    ));
    let mut config = config();
    config.provider.concatenate = false;
    let provider = provider_with(&robot, config, lookup.clone());

    provider.execute(&create_txt("abc123")).await.unwrap();

    assert_eq!(lookup.query_count("CNAME"), 0);
    assert!(robot.zonefile(EXAMPLE_COM_ID).contains("\"abc123\""));
}
