//! HTTP handler: compose and project one target per request
//!
//! Each request gets its own session, so the composition cache never
//! outlives the request.

use lambda_http::{run, service_fn, Body, Error, Request, RequestPayloadExt, Response};
use quota_engine::{
    CompositionSolver, Preference, QuotaProduct, SimulationConfig, SimulationOutcome, SimulationSession,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct SimulationRequest {
    catalog: Vec<QuotaProduct>,
    target: f64,
    #[serde(default)]
    preference: Preference,
    #[serde(default)]
    config: SimulationConfig,
    #[serde(default)]
    solver: CompositionSolver,
}

fn simulate(request: SimulationRequest) -> quota_engine::Result<SimulationOutcome> {
    let session = SimulationSession::new(request.solver, request.config)?;
    session.run(&request.catalog, request.target, request.preference)
}

fn respond(status: u16, body: serde_json::Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?)
}

async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let request = match event.payload::<SimulationRequest>() {
        Ok(Some(request)) => request,
        Ok(None) => return respond(400, json!({ "error": "expected a JSON request body" })),
        Err(e) => return respond(400, json!({ "error": e.to_string() })),
    };

    match simulate(request) {
        Ok(outcome) => respond(200, serde_json::to_value(&outcome)?),
        Err(e) => {
            log::info!("Rejected simulation request: {}", e);
            respond(400, json!({ "error": e.to_string() }))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
