mod common;

use common::single_row_order;
use payorder::domain::ids::OrderId;
use payorder::domain::order::Order;
use payorder::domain::payment_type::PaymentType;
use payorder::domain::ports::OrderStoreBox;
use payorder::infrastructure::in_memory::InMemoryOrderStore;

#[tokio::test]
async fn test_store_as_trait_object() {
    let store: OrderStoreBox = Box::new(InMemoryOrderStore::new());

    let mut order = Order::create(OrderId(1), single_row_order(PaymentType::PaymentPlan)).unwrap();
    order.deliver_all().unwrap();

    // Verify Send + Sync by moving the store into a task
    let handle = tokio::spawn(async move {
        store.store(order).await.unwrap();
        let exists = store.exists(OrderId(1)).await.unwrap();
        (exists, store.get(OrderId(1)).await.unwrap().unwrap())
    });

    let (exists, retrieved) = handle.await.unwrap();
    assert!(exists);
    assert_eq!(retrieved.id, OrderId(1));
    assert_eq!(retrieved.deliveries.len(), 1);
}
