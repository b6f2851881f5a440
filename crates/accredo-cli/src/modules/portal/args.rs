use clap::Args;

#[derive(Args)]
pub struct RequestArgs {
    #[arg(help = "HTTP method, e.g. GET or POST")]
    pub method: String,
    #[arg(help = "Path relative to the API base URL, e.g. /entities/")]
    pub path: String,
    #[arg(long, help = "JSON request body")]
    pub data: Option<String>,
}
