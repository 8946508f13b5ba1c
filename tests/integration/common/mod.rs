pub mod fake_agent_server;
