//! AWS Lambda handler for loan and investment simulations
//!
//! Accepts one simulation request, tagged by `product`, or a batch under
//! `requests`, and returns the results as JSON. Invalid inputs are not HTTP
//! errors: they come back with `is_valid: false` and the reason. Only
//! malformed bodies get a 400.

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

use loan_simulator::{ScenarioRunner, SimulationOutcome, SimulationRequest};

/// A single simulation or a batch
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LambdaRequest {
    Batch { requests: Vec<SimulationRequest> },
    Single(SimulationRequest),
}

#[derive(Debug, Serialize)]
struct LambdaResponse {
    results: Vec<SimulationOutcome>,
    valid_count: usize,
    execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn response(status: i64, body: String) -> ApiGatewayProxyResponse {
    ApiGatewayProxyResponse {
        status_code: status,
        body: Some(Body::Text(body)),
        ..Default::default()
    }
}

fn error_response(status: i64, message: String) -> Result<ApiGatewayProxyResponse, Error> {
    let body = serde_json::to_string(&ErrorBody { error: message })?;
    Ok(response(status, body))
}

async fn handler(
    runner: &ScenarioRunner,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let start = std::time::Instant::now();
    let payload = event.payload;

    // CORS preflight
    if payload.http_method.as_str() == "OPTIONS" {
        return Ok(response(200, String::new()));
    }
    if payload.is_base64_encoded {
        return error_response(400, "binary bodies are not supported".to_string());
    }

    let body = payload.body.unwrap_or_default();
    let request: LambdaRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => return error_response(400, format!("Invalid JSON: {}", e)),
    };

    let results = match request {
        LambdaRequest::Batch { requests } => runner.run_batch(&requests),
        LambdaRequest::Single(request) => vec![runner.run(&request)],
    };
    let valid_count = results.iter().filter(|r| r.is_valid()).count();
    log::info!("Ran {} simulations, {} valid", results.len(), valid_count);

    let body = LambdaResponse {
        results,
        valid_count,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };
    Ok(response(200, serde_json::to_string(&body)?))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let runner = ScenarioRunner::new();
    let runner = &runner;
    run(service_fn(move |event| async move { handler(runner, event).await })).await
}
