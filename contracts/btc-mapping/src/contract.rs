#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::set_contract_version;

use crate::entrypoints;
use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::state::{Config, CONFIG};

const CONTRACT_NAME: &str = "crates.io:btc-mapping";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let oracle = deps.api.addr_validate(&msg.oracle)?;
    CONFIG.save(
        deps.storage,
        &Config {
            owner: info.sender,
            oracle,
            network: msg.network,
        },
    )?;

    Ok(Response::new().add_attribute("action", "instantiate"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::SeedBlocks {
            block_header,
            block_height,
        } => entrypoints::seed_blocks(deps.storage, info, block_header, block_height),
        ExecuteMsg::AddBlocks { blocks, latest_fee } => {
            entrypoints::add_blocks(deps.storage, info, blocks, latest_fee)
        }
        ExecuteMsg::Map {
            tx_data,
            instructions,
            sender,
        } => entrypoints::map(deps.storage, tx_data, instructions, sender),
        ExecuteMsg::Unmap {
            amount,
            to,
            from,
            sender,
            sender_intents,
        } => entrypoints::unmap(deps.storage, env, amount, to, from, sender, sender_intents),
        ExecuteMsg::Transfer {
            amount,
            to,
            from,
            caller,
            caller_intents,
        } => entrypoints::transfer(deps.storage, env, amount, to, from, caller, caller_intents),
        ExecuteMsg::TransferFrom {
            amount,
            to,
            from,
            sender,
            sender_intents,
        } => entrypoints::transfer_from(deps.storage, env, amount, to, from, sender, sender_intents),
        ExecuteMsg::RegisterPublicKey {
            primary_public_key,
            backup_public_key,
        } => entrypoints::register_public_key(deps.storage, info, primary_public_key, backup_public_key),
        ExecuteMsg::CreateKeyPair {} => entrypoints::create_key_pair(deps.storage, info),
        ExecuteMsg::RegisterRouter { contract_id } => {
            entrypoints::register_router(deps.storage, info, contract_id)
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Balance { account } => to_json_binary(&entrypoints::balance(deps.storage, account)?),
        QueryMsg::LastHeight {} => to_json_binary(&entrypoints::last_height(deps.storage)?),
        QueryMsg::Supply {} => to_json_binary(&entrypoints::supply(deps.storage)?),
        QueryMsg::UtxoRegistry {} => to_json_binary(&entrypoints::utxo_registry(deps.storage)?),
        QueryMsg::UtxoDetail { id } => to_json_binary(&entrypoints::utxo_detail(deps.storage, id)?),
        QueryMsg::TxSpend { txid } => to_json_binary(&entrypoints::tx_spend(deps.storage, txid)?),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let original_version = cw2::ensure_from_older_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("new_version", original_version.to_string()))
}
