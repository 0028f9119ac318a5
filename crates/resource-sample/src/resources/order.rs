use api_resource_loader::{Resource, ResourceConfigBuilder, Schema, StoreResource};

/// Orders, with their line items nested under them.
#[derive(Debug, Default)]
pub struct Order;

impl Resource for Order {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config.nest("items").belongs_to("customer")
    }

    fn schema(&self, schema: &mut Schema) {
        schema.increments("id").primary();
        schema.string("customer_id");
        schema.float("total");
    }
}

impl StoreResource for Order {}

#[derive(Debug, Default)]
pub struct OrderItem;

impl Resource for OrderItem {
    fn configure(&self, config: ResourceConfigBuilder) -> ResourceConfigBuilder {
        config.endpoint("items").timestamps(false)
    }

    fn schema(&self, schema: &mut Schema) {
        schema.increments("id").primary();
        schema.integer("order_id");
        schema.string("sku");
        schema.integer("quantity");
    }
}

impl StoreResource for OrderItem {}
