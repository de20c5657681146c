//! Lua scripts for atomic session updates.
//!
//! Redis runs each script as a single command, so no other client can
//! observe or interleave with a half-applied rotation.

/// Compare-and-swap of a user's session.
///
/// Arguments:
/// - KEYS[1]: User key (`session:user:{id}`)
/// - KEYS[2]: New token's resolution key
/// - KEYS[3]: Superseded token's resolution key (ignored when ARGV[1] is empty)
/// - ARGV[1]: Expected current token, empty string for "no session"
/// - ARGV[2]: New token
/// - ARGV[3]: User id (decimal)
/// - ARGV[4]: TTL in seconds
///
/// Returns:
/// - `{1, new_token}`: swapped
/// - `{0, current}`: user key did not match; `current` is nil if absent
pub const ROTATE_SESSION: &str = r#"
local current = redis.call('GET', KEYS[1])
local expected = ARGV[1]

if expected == '' then
    if current then
        return {0, current}
    end
elseif current ~= expected then
    return {0, current or false}
end

if expected ~= '' then
    redis.call('DEL', KEYS[3])
end

redis.call('SET', KEYS[2], ARGV[3], 'EX', ARGV[4])
redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[4])
return {1, ARGV[2]}
"#;
