use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub const SERVICE_NAME: &str = "eats-service";

#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    http_errors: IntCounterVec,
    graphql_requests: IntCounterVec,
    orders_created: IntCounter,
    order_status_changes: IntCounterVec,
    promotions_expired: IntCounter,
    emails_sent: IntCounterVec,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_errors = IntCounterVec::new(
            Opts::new(
                "http_errors_total",
                "Count of HTTP error responses emitted (status >= 400)",
            ),
            &["service", "code", "status"],
        )?;
        registry.register(Box::new(http_errors.clone()))?;

        let graphql_requests = IntCounterVec::new(
            Opts::new(
                "graphql_requests_total",
                "Count of GraphQL operations grouped by operation type",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(graphql_requests.clone()))?;

        let orders_created = IntCounter::new("orders_created_total", "Count of orders placed")?;
        registry.register(Box::new(orders_created.clone()))?;

        let order_status_changes = IntCounterVec::new(
            Opts::new(
                "order_status_changes_total",
                "Count of order status transitions grouped by target status",
            ),
            &["status"],
        )?;
        registry.register(Box::new(order_status_changes.clone()))?;

        let promotions_expired = IntCounter::new(
            "promotions_expired_total",
            "Count of restaurant promotions cleared by the sweeper",
        )?;
        registry.register(Box::new(promotions_expired.clone()))?;

        let emails_sent = IntCounterVec::new(
            Opts::new("emails_sent_total", "Count of outbound emails grouped by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(emails_sent.clone()))?;

        Ok(Self {
            registry,
            http_errors,
            graphql_requests,
            orders_created,
            order_status_changes,
            promotions_expired,
            emails_sent,
        })
    }

    pub fn http_error(&self, code: &str, status: StatusCode) {
        self.http_errors
            .with_label_values(&[SERVICE_NAME, code, status.as_str()])
            .inc();
    }

    pub fn graphql_request(&self, operation: &str) {
        self.graphql_requests.with_label_values(&[operation]).inc();
    }

    pub fn order_created(&self) {
        self.orders_created.inc();
    }

    pub fn order_status_changed(&self, status: &str) {
        self.order_status_changes.with_label_values(&[status]).inc();
    }

    pub fn promotions_expired(&self, count: u64) {
        self.promotions_expired.inc_by(count);
    }

    pub fn email_sent(&self, outcome: &str) {
        self.emails_sent.with_label_values(&[outcome]).inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_render() {
        let metrics = ServiceMetrics::new().expect("metrics");
        metrics.order_created();
        metrics.order_status_changed("Delivered");
        metrics.http_error("upload_failed", StatusCode::BAD_GATEWAY);

        let families = metrics.registry.gather();
        let names: Vec<&str> = families.iter().map(|family| family.get_name()).collect();
        assert!(names.contains(&"orders_created_total"));
        assert!(names.contains(&"order_status_changes_total"));
        assert!(names.contains(&"http_errors_total"));

        let response = metrics.render().expect("render");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
