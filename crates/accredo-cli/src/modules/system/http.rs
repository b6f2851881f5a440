/// Prints a JSON body pretty, or fails with the status and raw body.
pub(crate) async fn print_json_response(response: reqwest::Response) -> anyhow::Result<()> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Request failed: {status} {body}");
    }
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(());
    }
    print_json_text(&body)
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_json_text(body: &str) -> anyhow::Result<()> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => print_json(&value),
        Err(_) => {
            println!("{body}");
            Ok(())
        }
    }
}
