use crate::common::*;
use rocket::http::Status;

#[test]
fn test_report_requires_a_room() {
    let client = test_client();
    let svc = services(&client);
    send_text(&client, 1, "/report");
    assert_sent_containing(&svc, 1, "only report a user while you are in a chat");
}

#[test]
fn test_report_snapshots_history_and_mirrors() {
    let client = test_client();
    let svc = services(&client);
    let room = pair_users(&client, 1, 2);

    send_text(&client, 1, "hi");
    send_text(&client, 2, "hi back");
    svc.gateway.clear_sent();

    send_text(&client, 1, "/report");
    assert_sent_containing(&svc, 1, "Report sent to admin");

    let reports = svc.db.all_reports();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.room_id, room);
    assert_eq!(report.reporter_id, 1);
    assert_eq!(report.reported_id, 2);
    assert!(!report.reviewed);
    assert_eq!(report.chat_history.len(), 2);
    assert_eq!(report.chat_history[0].text, "hi");

    let mirrors = texts_to(&svc, MOD_CHANNEL);
    let mirror = mirrors
        .iter()
        .find(|t| t.contains("REPORT RECEIVED"))
        .expect("report mirrored");
    assert!(mirror.contains(&room));
    assert!(mirror.contains("Reporter:"));
    assert!(mirror.contains("Reported:"));
    assert!(mirror.contains("Total messages in room: 2"));
    assert!(mirror.contains("No specific message was reported"));
}

#[test]
fn test_report_with_reply_quotes_the_message() {
    let client = test_client();
    let svc = services(&client);
    pair_users(&client, 1, 2);
    send_text(&client, 2, "something nasty");
    svc.gateway.clear_sent();

    let status = post_update(
        &client,
        reply_update(1, "/report", 2, "something nasty"),
    );
    assert_eq!(status, Status::Ok);

    let mirrors = texts_to(&svc, MOD_CHANNEL);
    let mirror = mirrors
        .iter()
        .find(|t| t.contains("REPORT RECEIVED"))
        .expect("report mirrored");
    assert!(mirror.contains("Reported Message (by user 2)"));
    assert!(mirror.contains("something nasty"));
}
