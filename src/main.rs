use std::process::ExitCode;

fn main() -> ExitCode {
    static_httpd::run()
}
