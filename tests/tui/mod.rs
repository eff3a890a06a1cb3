mod cli_test;
mod common;
mod render_test;
