fn main() {
    // option_env!() values are cached by cargo unless it is told to watch them.
    println!("cargo:rerun-if-env-changed=AUTHGATE_DEFAULT_API_URL");
    println!("cargo:rerun-if-env-changed=AUTHGATE_DEFAULT_REFRESH_PATH");
}
