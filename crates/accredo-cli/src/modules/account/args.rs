use clap::Args;

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

#[derive(Args)]
pub struct ActivateArgs {
    #[arg(help = "Encoded user id from the activation link")]
    pub uid: String,
    #[arg(help = "Activation token from the activation link")]
    pub token: String,
}

#[derive(Args)]
pub struct ResetPasswordArgs {
    #[arg(long)]
    pub email: String,
}

#[derive(Args)]
pub struct ResetPasswordConfirmArgs {
    pub uid: String,
    pub token: String,
    #[arg(long)]
    pub new_password: Option<String>,
}
