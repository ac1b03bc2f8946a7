mod add_panel_contract;
mod config_contract;
mod entry_contract;
mod install_contract;
mod link_contract;
mod reset_password_contract;
mod uninstall_contract;
mod update_contract;
