use anyhow::Result;
use qbo_oauth::AccountingClient;
use qbo_oauth::api::company_info_endpoint;

use crate::cli::{CallArgs, OutputFormat};
use crate::output::print_value;

pub async fn call(client: &AccountingClient, args: &CallArgs, format: OutputFormat) -> Result<()> {
    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| company_info_endpoint(&args.realm_id));

    tracing::info!(realm_id = %args.realm_id, endpoint = %endpoint, "Calling accounting API");
    let body = client.get(&args.realm_id, &endpoint, &args.access_token).await?;
    print_value(&body, format)
}
