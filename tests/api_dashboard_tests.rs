//! 资产、流水记录与仪表盘 API 集成测试
//!
//! 需要 PostgreSQL：设置 TEST_DATABASE_URL 后运行 `cargo test -- --ignored`

use axum::http::StatusCode;
use mams_service::models::user::Role;
use serde_json::json;
use serial_test::serial;

mod common;
use common::{create_test_app, create_test_asset, create_test_user, login, send, setup_test_db};

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_dashboard_overview_rollup() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    create_test_user(&pool, "admin1", Role::Admin, None).await;
    create_test_asset(&pool, "Humvee", "Vehicle", "Base-A", 12, 3).await;
    create_test_asset(&pool, "M4 Carbine", "Weapon", "Base-A", 5, 2).await;
    create_test_asset(&pool, "Truck", "Vehicle", "Base-B", 4, 0).await;
    let app = create_test_app(pool);

    let token = login(&app, "admin1").await;

    let (status, body) = send(&app, "GET", "/api/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["totalAssets"], 3);
    assert_eq!(body["summary"]["totalAssigned"], 5);
    assert_eq!(body["summary"]["totalAvailable"], 16);
    assert_eq!(body["assetsByType"]["Vehicle"]["count"], 2);
    assert_eq!(body["assetsByType"]["Weapon"]["count"], 1);
    assert!(body["recentTransfers"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/api/dashboard?base=Base-A&assetType=Vehicle", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["totalAssets"], 1);
    assert_eq!(body["summary"]["totalAvailable"], 9);
    assert_eq!(body["filters"]["base"], "Base-A");
    assert_eq!(body["filters"]["assetType"], "Vehicle");
}

/// 按指定时间直接写入一条调拨记录
async fn insert_transfer_at(
    pool: &sqlx::PgPool,
    asset_id: uuid::Uuid,
    from_base: &str,
    to_base: &str,
    transferred_by: uuid::Uuid,
    minutes_ago: i64,
) -> uuid::Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO transfers (asset_id, from_base, to_base, quantity, transferred_by, created_at, updated_at)
        VALUES ($1, $2, $3, 1, $4, NOW() - make_interval(mins => $5::int), NOW())
        RETURNING id
        "#,
    )
    .bind(asset_id)
    .bind(from_base)
    .bind(to_base)
    .bind(transferred_by)
    .bind(minutes_ago as i32)
    .fetch_one(pool)
    .await
    .expect("Failed to insert transfer")
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_recent_transfers_limited_to_base_newest_first() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    let admin = create_test_user(&pool, "admin1", Role::Admin, None).await;
    let at_a = create_test_asset(&pool, "Humvee", "Vehicle", "Base-A", 50, 0).await;
    let at_c = create_test_asset(&pool, "Truck", "Vehicle", "Base-C", 50, 0).await;
    let at_d = create_test_asset(&pool, "Jeep", "Vehicle", "Base-D", 50, 0).await;

    // 出入 Base-A 共 7 条，交替方向；另有一条最新的无关调拨
    let mut touching_a = Vec::new();
    for minutes_ago in 1..=7 {
        let id = if minutes_ago % 2 == 0 {
            insert_transfer_at(&pool, at_a.id, "Base-A", "Base-B", admin.id, minutes_ago).await
        } else {
            insert_transfer_at(&pool, at_c.id, "Base-C", "Base-A", admin.id, minutes_ago).await
        };
        touching_a.push(id.to_string());
    }
    insert_transfer_at(&pool, at_d.id, "Base-D", "Base-E", admin.id, 0).await;

    let app = create_test_app(pool);
    let token = login(&app, "admin1").await;

    let (status, body) = send(&app, "GET", "/api/dashboard?base=Base-A", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let recent = body["recentTransfers"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    for transfer in recent {
        assert!(transfer["fromBase"] == "Base-A" || transfer["toBase"] == "Base-A");
    }

    let ids: Vec<&str> = recent.iter().map(|t| t["id"].as_str().unwrap()).collect();
    let expected: Vec<&str> = touching_a.iter().take(5).map(String::as_str).collect();
    assert_eq!(ids, expected);

    let created: Vec<chrono::DateTime<chrono::FixedOffset>> = recent
        .iter()
        .map(|t| chrono::DateTime::parse_from_rfc3339(t["createdAt"].as_str().unwrap()).unwrap())
        .collect();
    assert!(created.windows(2).all(|pair| pair[0] > pair[1]));
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_base_commander_sees_only_own_base() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    create_test_user(&pool, "cmdr1", Role::BaseCommander, Some("Base-A")).await;
    create_test_asset(&pool, "Humvee", "Vehicle", "Base-A", 12, 3).await;
    let other = create_test_asset(&pool, "Truck", "Vehicle", "Base-B", 4, 0).await;
    let app = create_test_app(pool);

    let token = login(&app, "cmdr1").await;

    // 请求其他基地时强制为自己的基地
    let (status, body) = send(&app, "GET", "/api/dashboard?base=Base-B", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filters"]["base"], "Base-A");
    assert_eq!(body["summary"]["totalAssets"], 1);

    let (status, _) = send(&app, "GET", "/api/dashboard/base/Base-B", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/dashboard/base/Base-A", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "Base-A");

    let (status, _) = send(&app, "GET", &format!("/api/dashboard/asset/{}", other.id), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/assets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["assets"][0]["base"], "Base-A");
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_asset_create_derives_balances() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    create_test_user(&pool, "officer1", Role::LogisticsOfficer, None).await;
    let app = create_test_app(pool);

    let token = login(&app, "officer1").await;

    let (status, asset) = send(
        &app,
        "POST",
        "/api/assets",
        Some(&token),
        Some(json!({
            "name": "Radio Set",
            "assetType": "Equipment",
            "base": "Base-C",
            "openingBalance": 20,
            "purchases": 10,
            "transferOut": 5,
            "assigned": 8
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(asset["closingBalance"], 25);
    assert_eq!(asset["available"], 17);

    let id = asset["id"].as_str().unwrap();
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/assets/{}", id),
        Some(&token),
        Some(json!({ "expended": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["closingBalance"], 20);
    assert_eq!(updated["available"], 12);

    // 分配数量超过期末余额
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/assets/{}", id),
        Some(&token),
        Some(json!({ "assigned": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_transfer_lifecycle() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    create_test_user(&pool, "admin2", Role::Admin, None).await;
    let asset = create_test_asset(&pool, "Humvee", "Vehicle", "Base-A", 12, 0).await;
    let app = create_test_app(pool);

    let token = login(&app, "admin2").await;

    // 源基地与资产所在基地不一致
    let (status, _) = send(
        &app,
        "POST",
        "/api/transfers",
        Some(&token),
        Some(json!({ "assetId": asset.id, "fromBase": "Base-B", "toBase": "Base-C", "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, transfer) = send(
        &app,
        "POST",
        "/api/transfers",
        Some(&token),
        Some(json!({ "assetId": asset.id, "fromBase": "Base-A", "toBase": "Base-B", "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(transfer["status"], "Pending");
    let id = transfer["id"].as_str().unwrap().to_string();

    // 跳过审批直接完成
    let status_uri = format!("/api/transfers/{}/status", id);
    let (status, _) = send(&app, "PUT", &status_uri, Some(&token), Some(json!({ "status": "Completed" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, approved) = send(&app, "PUT", &status_uri, Some(&token), Some(json!({ "status": "Approved" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approved["approvedBy"].is_string());

    let (status, completed) = send(&app, "PUT", &status_uri, Some(&token), Some(json!({ "status": "Completed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "Completed");

    // 两端基地都能查到这条调拨
    let (status, body) = send(&app, "GET", "/api/transfers?base=Base-B", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, detail) = send(&app, "GET", &format!("/api/dashboard/asset/{}", asset.id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["transfers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_role_limits_on_movement_records() {
    let config = common::create_test_config();
    let pool = setup_test_db(&config).await;
    create_test_user(&pool, "officer2", Role::LogisticsOfficer, None).await;
    create_test_user(&pool, "cmdr2", Role::BaseCommander, Some("Base-A")).await;
    let asset = create_test_asset(&pool, "Rations", "Supplies", "Base-A", 500, 0).await;
    let app = create_test_app(pool);

    let officer = login(&app, "officer2").await;
    let commander = login(&app, "cmdr2").await;

    // 后勤官可以采购，但不能消耗
    let (status, _) = send(
        &app,
        "POST",
        "/api/purchases",
        Some(&officer),
        Some(json!({ "assetId": asset.id, "base": "Base-A", "quantity": 100, "supplier": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let expenditure = json!({
        "assetId": asset.id,
        "base": "Base-A",
        "quantity": 20,
        "reason": "Field exercise"
    });
    let (status, _) = send(&app, "POST", "/api/expenditures", Some(&officer), Some(expenditure.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", "/api/expenditures", Some(&commander), Some(expenditure)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, assignment) = send(
        &app,
        "POST",
        "/api/assignments",
        Some(&commander),
        Some(json!({ "assetId": asset.id, "base": "Base-A", "quantity": 10, "assignedTo": "Sgt. Rivera" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["status"], "Active");

    let (status, returned) = send(
        &app,
        "PUT",
        &format!("/api/assignments/{}/status", assignment["id"].as_str().unwrap()),
        Some(&commander),
        Some(json!({ "status": "Returned" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(returned["endDate"].is_string());

    // 指挥官不能在其他基地下单
    let (status, _) = send(
        &app,
        "POST",
        "/api/purchases",
        Some(&commander),
        Some(json!({ "assetId": asset.id, "base": "Base-B", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/dashboard", Some(&commander), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recentPurchases"].as_array().unwrap().len(), 1);
    assert_eq!(body["recentExpenditures"].as_array().unwrap().len(), 1);
    assert_eq!(body["recentAssignments"].as_array().unwrap().len(), 1);
}
