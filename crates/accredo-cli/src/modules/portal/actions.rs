use accredo_session::{ApiRequest, AuthenticatedClient};
use reqwest::Method;

use crate::cli_args::RequestArgs;
use crate::modules::auth::run_protected;
use crate::modules::system::http::print_json_response;

pub(crate) async fn handle_request(
    args: RequestArgs,
    client: &AuthenticatedClient,
) -> anyhow::Result<()> {
    let request = build_request(args)?;
    let response = run_protected(client.store(), client.send(request)).await?;
    print_json_response(response).await
}

pub(crate) fn build_request(args: RequestArgs) -> anyhow::Result<ApiRequest> {
    let method = Method::from_bytes(args.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow::anyhow!("invalid HTTP method: {}", args.method))?;
    let mut request = ApiRequest::new(method, args.path);
    if let Some(data) = args.data {
        let body: serde_json::Value = serde_json::from_str(&data)
            .map_err(|err| anyhow::anyhow!("--data is not valid JSON: {err}"))?;
        request = request.with_body(body);
    }
    Ok(request)
}
