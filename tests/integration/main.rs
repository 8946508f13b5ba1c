mod common;
mod http_service_test;
