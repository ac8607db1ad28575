//! Validates a synthesized graph schema
//!
//! This example shows how to:
//! - Build a candidate schema
//! - Run the four-stage validation pipeline, with or without live data
//! - Read findings and the training approval decision
//!
//! Set NEO4J_PASSWORD (and optionally NEO4J_URI) to check the schema against
//! a running database; otherwise the semantic stage is skipped.

use gibsgraph_kg::{
    GraphSchema, Neo4jClient, Neo4jSettings, NodeSchema, RelationshipSchema, SchemaValidator,
    ValidationResult, ValidatorConfig,
};
use tracing_subscriber::EnvFilter;

fn payments_schema() -> GraphSchema {
    let constraints = vec![
        "CREATE CONSTRAINT customer_id IF NOT EXISTS FOR (c:Customer) REQUIRE c.id IS UNIQUE"
            .to_string(),
    ];
    let indexes =
        vec!["CREATE INDEX payment_time IF NOT EXISTS FOR (p:Payment) ON (p.timestamp)".to_string()];
    let cypher_setup = format!("{};\n{};", constraints[0], indexes[0]);

    GraphSchema {
        nodes: vec![
            NodeSchema::new("Customer")
                .with_properties(&["id", "name", "risk_rating"])
                .with_required(&["id"])
                .justified_by("KYC requires a verified identity for every payer"),
            NodeSchema::new("Payment")
                .with_properties(&["id", "amount", "timestamp"])
                .with_required(&["id", "amount", "timestamp"])
                .justified_by("AML monitoring needs every transfer with its time"),
            NodeSchema::new("Merchant")
                .with_properties(&["id", "mcc"])
                .with_required(&["id", "country"])
                .justified_by("Merchant category codes drive fraud scoring"),
        ],
        relationships: vec![
            RelationshipSchema::new("MADE", "Customer", "Payment")
                .with_direction_rationale("Payer initiates the payment")
                .justified_by("Velocity checks walk payments per customer"),
            RelationshipSchema::new("PAID_TO", "Payment", "Merchant")
                .with_direction_rationale("Funds flow to the merchant")
                .justified_by("Chargeback disputes start from the merchant"),
        ],
        constraints,
        indexes,
        cypher_setup,
    }
}

fn report(result: &ValidationResult) {
    println!("   Syntactic gate:   {}", if result.syntactic { "passed" } else { "FAILED" });
    println!("   Structural score: {}", result.structural_score);
    println!("   Semantic score:   {}", result.semantic_score);
    println!("   Domain score:     {}", result.domain_score);
    println!("   Overall score:    {}", result.overall_score);
    println!("   Approved:         {}", result.approved_for_training);
    for finding in &result.findings {
        println!("   - {}", finding);
    }
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let schema = payments_schema();
    println!("Candidate schema:\n{}\n", serde_json::to_string_pretty(&schema)?);

    // 1. Strict validation without data
    println!("1. Validating without a database (strict)...");
    let result = SchemaValidator::new(ValidatorConfig::default())
        .validate(&schema)
        .await;
    report(&result);

    // 2. Lenient validation without data
    println!("2. Validating without a database (lenient)...");
    let result = SchemaValidator::new(ValidatorConfig::lenient())
        .validate(&schema)
        .await;
    report(&result);

    // 3. Validation against live data, if configured
    match Neo4jSettings::from_env() {
        Ok(settings) => {
            println!("3. Connecting to Neo4j at {}...", settings.uri);
            let client = Neo4jClient::connect(&settings).await?;
            println!("   ✓ Connected\n");

            let validator =
                SchemaValidator::with_source(ValidatorConfig::default(), client.inspector());
            let result = validator.validate(&schema).await;
            report(&result);
        }
        Err(e) => println!("3. Skipping live validation: {}", e),
    }

    Ok(())
}
