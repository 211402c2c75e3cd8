const AZURE_ACCESS_TOKEN: &str = "AZURE_ACCESS_TOKEN";

pub fn get_access_token() -> Option<String> {
    non_empty_var(AZURE_ACCESS_TOKEN)
}

const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";

pub fn get_tenant_id() -> Option<String> {
    non_empty_var(AZURE_TENANT_ID)
}

const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";

pub fn get_client_id() -> Option<String> {
    non_empty_var(AZURE_CLIENT_ID)
}

const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

pub fn get_client_secret() -> Option<String> {
    non_empty_var(AZURE_CLIENT_SECRET)
}

const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

pub fn get_authority_host() -> String {
    non_empty_var(AZURE_AUTHORITY_HOST).unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
