mod detection_contract;
mod links_contract;
mod synthesis_contract;
