use clap::Args;

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long, env = "ACCREDO_EMAIL")]
    pub email: Option<String>,
    #[arg(long, env = "ACCREDO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub slug: Option<String>,
}
