mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal_macros::dec;
use stockroom_api::{
    entities::MovementType,
    errors::ServiceError,
    repositories::{ItemChanges, ItemRepository, NewItem, NewStockMovement},
};

#[tokio::test]
async fn create_assigns_identity_and_defaults_quantity() {
    let app = TestApp::new().await;

    let item = app
        .state
        .items
        .create(NewItem {
            name: "Desk lamp".into(),
            description: Some("LED, warm white".into()),
            price: Some(dec!(12.5)),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(item.id > 0);
    assert!(!item.public_id.is_nil());
    assert_eq!(item.quantity, 0);
    assert_eq!(item.name, "Desk lamp");
    assert_eq!(item.description.as_deref(), Some("LED, warm white"));
    assert_eq!(item.price, Some(dec!(12.5)));
    assert_eq!(item.created_at, item.updated_at);

    let other = app.seed_item("Chair", 3).await;
    assert_ne!(other.public_id, item.public_id);
    assert!(other.id > item.id);
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let app = TestApp::new().await;

    let blank = app
        .state
        .items
        .create(NewItem {
            name: "  ".into(),
            ..Default::default()
        })
        .await;
    assert_matches!(blank, Err(ServiceError::ValidationError(_)));

    let negative = app
        .state
        .items
        .create(NewItem {
            name: "Chair".into(),
            quantity: Some(-2),
            ..Default::default()
        })
        .await;
    assert_matches!(negative, Err(ServiceError::ValidationError(_)));

    assert!(app.state.items.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_items_in_id_order() {
    let app = TestApp::new().await;
    let a = app.seed_item("A", 1).await;
    let b = app.seed_item("B", 2).await;
    let c = app.seed_item("C", 3).await;

    let ids: Vec<i32> = app
        .state
        .items
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn update_touches_only_present_fields() {
    let app = TestApp::new().await;
    let item = app
        .state
        .items
        .create(NewItem {
            name: "Desk lamp".into(),
            description: Some("LED".into()),
            category_id: Some(7),
            location_id: Some(2),
            quantity: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();

    let updated = app
        .state
        .items
        .update(
            item.id,
            ItemChanges {
                name: Some("Floor lamp".into()),
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Floor lamp");
    assert_eq!(updated.description, None);
    assert_eq!(updated.category_id, Some(7));
    assert_eq!(updated.location_id, Some(2));
    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.public_id, item.public_id);
    assert_eq!(updated.created_at, item.created_at);
    assert!(updated.updated_at >= item.updated_at);
}

#[tokio::test]
async fn empty_or_missing_update_reports_nothing_changed() {
    let app = TestApp::new().await;
    let item = app.seed_item("Desk lamp", 1).await;

    let empty = app
        .state
        .items
        .update(item.id, ItemChanges::default())
        .await;
    assert_matches!(empty, Err(ServiceError::NotFound(msg)) => {
        assert_eq!(msg, "Item not found or no changes made");
    });

    let missing = app
        .state
        .items
        .update(
            4242,
            ItemChanges {
                name: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(missing, Err(ServiceError::NotFound(_)));

    assert_eq!(app.state.items.get(item.id).await.unwrap().name, "Desk lamp");
}

#[tokio::test]
async fn delete_removes_item_and_its_history() {
    let app = TestApp::new().await;
    let item = app.seed_item("Desk lamp", 10).await;
    let keeper = app.seed_item("Chair", 10).await;

    for id in [item.id, keeper.id] {
        app.state
            .stock
            .record_movement(NewStockMovement::new(id, MovementType::Out, 2))
            .await
            .unwrap();
    }

    app.state.items.delete(item.id).await.unwrap();

    assert_matches!(
        app.state.items.get(item.id).await,
        Err(ServiceError::NotFound(_))
    );
    assert!(app.state.stock.get_history(item.id).await.unwrap().is_empty());
    assert_eq!(app.state.stock.get_history(keeper.id).await.unwrap().len(), 1);

    assert_matches!(
        app.state.items.delete(item.id).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn quantity_compare_and_set_rejects_stale_values() {
    let app = TestApp::new().await;
    let item = app.seed_item("Desk lamp", 10).await;

    let stale = ItemRepository::update_quantity(app.db(), item.id, 9, 1)
        .await
        .unwrap();
    assert!(!stale);
    assert_eq!(app.quantity_of(item.id).await, 10);

    let fresh = ItemRepository::update_quantity(app.db(), item.id, 10, 1)
        .await
        .unwrap();
    assert!(fresh);
    assert_eq!(app.quantity_of(item.id).await, 1);
}
