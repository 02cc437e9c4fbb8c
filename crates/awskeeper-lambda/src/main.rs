// AWS Lambda binary entry point
//
// Build with: cargo build -p awskeeper-lambda
//
// The lambda_runtime crate drives the handler on the tokio runtime started here

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    awskeeper_lambda::run().await
}
