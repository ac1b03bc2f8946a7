mod fake_network;
mod fake_runtime;
mod fake_templates;
mod scripted_prompter;
mod test_env;

#[allow(unused_imports)]
pub use fake_network::{FakeAddresses, FakePorts, FakeReadiness, FakeSourceTree};
#[allow(unused_imports)]
pub use fake_runtime::FakeRuntime;
#[allow(unused_imports)]
pub use fake_templates::{CountingFetcher, sample_templates, shipped_templates_dir};
#[allow(unused_imports)]
pub use scripted_prompter::ScriptedPrompter;
#[allow(unused_imports)]
pub use test_env::TestEnv;
