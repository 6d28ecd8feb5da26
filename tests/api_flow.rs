//! 需要真实 Postgres 的端到端流程测试
//!
//! 运行方式: `DATABASE_URL=postgres://... cargo test -- --ignored`

mod common;

use axum::http::{Method, StatusCode};
use backend::utils::error_codes;
use common::{app_with_pool, call, register};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn register_and_login(pool: PgPool) {
    let app = app_with_pool(pool);
    let (id, _) = register(&app, "Runner@Example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "runner@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "Email already registered");

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "runner@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["id"], id);
    assert!(body["resp_data"]["token"].is_string());

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "runner@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "Invalid password");

    let (status, body) = call(&app, Method::GET, "/auth/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["resp_data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].get("hashedPassword").is_none());
    assert!(users[0].get("hashed_password").is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn event_lifecycle(pool: PgPool) {
    let app = app_with_pool(pool);
    let (owner_id, owner) = register(&app, "owner@example.com").await;
    let (guest_id, guest) = register(&app, "guest@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/locations",
        None,
        Some(json!({ "firstLine": "1 Park Lane", "city": "Leeds", "postcode": "LS1 1AA" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let location_id = body["resp_data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        "/events",
        Some(&owner),
        Some(json!({
            "name": "Park 10k",
            "date": "2099-05-01T09:00:00Z",
            "distance": 10.0,
            "ticketPrice": 12.5,
            "locationId": location_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let event = &body["resp_data"];
    assert_eq!(event["userId"], owner_id);
    let event_id = event["id"].as_i64().unwrap();
    let event_uri = format!("/events/{}", event_id);

    let (status, body) = call(
        &app,
        Method::POST,
        "/events",
        Some(&owner),
        Some(json!({ "name": "Ghost run", "date": "2099-05-01", "locationId": 9999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Location not found");

    let (status, body) = call(&app, Method::GET, "/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"].as_array().unwrap().len(), 1);

    let (status, body) = call(&app, Method::GET, "/events/past", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["resp_data"].as_array().unwrap().is_empty());

    // 非创建者不能修改
    let (status, body) = call(
        &app,
        Method::PATCH,
        &event_uri,
        Some(&guest),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], error_codes::PERMISSION_DENIED);

    let (status, body) = call(
        &app,
        Method::PATCH,
        &event_uri,
        Some(&owner),
        Some(json!({ "ticketPrice": 15.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["name"], "Park 10k");
    assert_eq!(body["resp_data"]["ticketPrice"], 15.0);

    // 评论
    let comments_uri = format!("{}/comments", event_uri);
    let (status, body) = call(
        &app,
        Method::POST,
        &comments_uri,
        Some(&guest),
        Some(json!({ "content": "See you there" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["resp_data"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        Method::POST,
        &comments_uri,
        Some(&guest),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Comment content is required");

    let comment_uri = format!("{}/{}", comments_uri, comment_id);
    let (status, _) = call(&app, Method::DELETE, &comment_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 报名
    let participants_uri = format!("{}/participants", event_uri);
    let (status, body) = call(&app, Method::POST, &participants_uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["resp_data"]["user"]["email"], "guest@example.com");

    let (status, body) = call(&app, Method::POST, &participants_uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::ALREADY_EXISTS);

    let admin_uri = format!("/admin/{}/participants", event_id);
    let (status, _) = call(&app, Method::GET, &admin_uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::GET, &admin_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"][0]["userId"], guest_id);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &admin_uri,
        Some(&owner),
        Some(json!({ "userId": guest_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::DELETE, &participants_uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 点赞切换两次回到零
    let likes_uri = format!("{}/likes", event_uri);
    let (status, _) = call(&app, Method::PATCH, &likes_uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = call(&app, Method::GET, &likes_uri, None, None).await;
    assert_eq!(body["resp_data"]["likes"], 1);

    let (status, _) = call(&app, Method::PATCH, &likes_uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, &likes_uri, None, None).await;
    assert_eq!(body["resp_data"]["likes"], 0);

    // 删除活动后评论一并删除
    let (status, _) = call(&app, Method::DELETE, &event_uri, Some(&guest), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::DELETE, &event_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, &event_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Event not found");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn group_membership_workflow(pool: PgPool) {
    let app = app_with_pool(pool);
    let (_, admin) = register(&app, "admin@example.com").await;
    let (member_id, member) = register(&app, "member@example.com").await;
    let (outsider_id, outsider) = register(&app, "outsider@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/groups",
        Some(&admin),
        Some(json!({ "groupName": "Morning Runners", "description": "6am club" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = body["resp_data"]["id"].as_i64().unwrap();
    let group_uri = format!("/groups/{}", group_id);

    let (status, _) = call(&app, Method::POST, &format!("{}/join", group_uri), Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::POST, &format!("{}/join", group_uri), Some(&member), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["resp_data"]["status"], "PENDING");

    let (status, body) = call(&app, Method::POST, &format!("{}/join", group_uri), Some(&member), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "You have already requested to join this group (PENDING)");

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("{}/pending-requests", group_uri),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"][0]["user"]["email"], "member@example.com");

    let approve_uri = format!("{}/approve/{}", group_uri, member_id);
    let (status, _) = call(&app, Method::PATCH, &approve_uri, Some(&outsider), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::PATCH, &approve_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["status"], "APPROVED");

    let (status, body) = call(&app, Method::GET, &format!("{}/members", group_uri), Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["members"][0]["id"], member_id);

    // 新闻：已通过成员可以发，外人不行
    let news_uri = format!("{}/news", group_uri);
    let (status, body) = call(
        &app,
        Method::POST,
        &news_uri,
        Some(&member),
        Some(json!({ "newsName": "Route change", "content": "Meet at the north gate" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["resp_data"]["user"]["email"], "member@example.com");

    let (status, body) = call(
        &app,
        Method::POST,
        &news_uri,
        Some(&outsider),
        Some(json!({ "newsName": "Spam", "content": "Buy shoes" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "Only approved members can post news in this group");

    let (status, body) = call(&app, Method::GET, &news_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"].as_array().unwrap().len(), 1);

    // 邀请外人后直接成为成员
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("{}/invite", group_uri),
        Some(&admin),
        Some(json!({ "userId": outsider_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["resp_data"]["status"], "APPROVED");

    let (status, body) = call(
        &app,
        Method::DELETE,
        &format!("{}/reject/{}", group_uri, outsider_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["status"], "REJECTED");

    let (status, body) = call(&app, Method::DELETE, &format!("{}/leave", group_uri), Some(&outsider), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Cannot leave a membership that is REJECTED");

    let (status, _) = call(&app, Method::DELETE, &format!("{}/leave", group_uri), Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, &format!("{}/membership", group_uri), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let memberships = body["resp_data"].as_array().unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0]["status"], "REJECTED");

    let (status, _) = call(&app, Method::DELETE, &format!("{}/leave", group_uri), Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn invite_reject_and_rejoin(pool: PgPool) {
    let app = app_with_pool(pool);
    let (_, admin) = register(&app, "admin@example.com").await;
    let (runner_id, runner) = register(&app, "runner@example.com").await;
    let (_, stranger) = register(&app, "stranger@example.com").await;

    let (_, body) = call(
        &app,
        Method::POST,
        "/groups",
        Some(&admin),
        Some(json!({ "groupName": "Trail Club" })),
    )
    .await;
    let group_uri = format!("/groups/{}", body["resp_data"]["id"].as_i64().unwrap());
    let invite_uri = format!("{}/invite", group_uri);
    let reject_uri = format!("{}/reject/{}", group_uri, runner_id);
    let pending_uri = format!("{}/pending-requests", group_uri);

    // 非管理员不能邀请，也看不到待审核列表
    let (status, _) = call(
        &app,
        Method::POST,
        &invite_uri,
        Some(&stranger),
        Some(json!({ "userId": runner_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::GET, &pending_uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::POST, &invite_uri, Some(&admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Missing user ID in request body");

    let (status, body) = call(
        &app,
        Method::POST,
        &invite_uri,
        Some(&admin),
        Some(json!({ "userId": 999_999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "User not found");

    // 新建记录返回 201
    let (status, body) = call(
        &app,
        Method::POST,
        &invite_uri,
        Some(&admin),
        Some(json!({ "userId": runner_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["resp_data"]["status"], "APPROVED");

    let (status, body) = call(
        &app,
        Method::POST,
        &invite_uri,
        Some(&admin),
        Some(json!({ "userId": runner_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::ALREADY_EXISTS);
    assert_eq!(body["msg"], "User is already a member of this group (APPROVED)");

    let (status, body) = call(&app, Method::DELETE, &reject_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"], json!({ "userId": runner_id, "status": "REJECTED" }));

    let (status, body) = call(&app, Method::DELETE, &reject_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Cannot reject a membership that is REJECTED");

    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("{}/approve/{}", group_uri, runner_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Cannot approve a membership that is REJECTED");

    // 被拒绝后可以重新申请
    let (status, body) = call(&app, Method::POST, &format!("{}/join", group_uri), Some(&runner), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["resp_data"]["status"], "PENDING");

    let (status, body) = call(&app, Method::GET, &pending_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let pending = body["resp_data"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["userId"], runner_id);
    assert_eq!(pending[0]["user"]["email"], "runner@example.com");

    // 对已有的待审核记录邀请是更新，返回 200
    let (status, body) = call(
        &app,
        Method::POST,
        &invite_uri,
        Some(&admin),
        Some(json!({ "userId": runner_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["status"], "APPROVED");

    let (_, body) = call(&app, Method::GET, &pending_uri, Some(&admin), None).await;
    assert!(body["resp_data"].as_array().unwrap().is_empty());

    let (status, body) = call(&app, Method::GET, &format!("{}/membership", group_uri), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let memberships = body["resp_data"].as_array().unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0]["status"], "APPROVED");

    // 待审核的申请也可以撤回
    let (status, _) = call(&app, Method::POST, &format!("{}/join", group_uri), Some(&stranger), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&app, Method::DELETE, &format!("{}/leave", group_uri), Some(&stranger), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, Method::DELETE, &format!("{}/leave", group_uri), Some(&stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "You are not a member of this group");
}
