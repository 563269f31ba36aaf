// GraphQL documents sent to the Director endpoint.
//
// Kept as plain text so they can be diffed against the schema docs.

/// Domain list with aggregate status and member device ids.
pub const DOMAINS: &str = "query Domains { domains { \
    id name \
    devices { id } \
    status { clocking connectivity latency subscriptions summary } } }";

/// Full device inventory grouped by domain.
pub const DOMAIN_DEVICES: &str = "query Devices { domains { id name \
    devices { \
    id name enrolmentState comments description location \
    domain { name } \
    connection { state lastChanged } \
    discovery { type fqdn } \
    identity { productModelName productVersion danteHardwareVersion productSoftwareVersion danteVersion } \
    manufacturer { name } \
    interfaces { address macAddress subnet netmask } \
    capabilities { CAN_WRITE_UNICAST_DELAY_REQUESTS CAN_WRITE_PREFERRED_MASTER CAN_WRITE_EXT_WORD_CLOCK CAN_UNICAST_CLOCKING } \
    status { clocking connectivity latency subscriptions summary } \
    rxChannels { mediaType name subscribedChannel subscribedDevice } \
    clockingState { followerWithoutLeader frequencyOffset grandLeader locked multicastLeader muteStatus unicastFollower unicastLeader } \
    clockPreferences { externalWordClock leader unicastClocking v1UnicastDelayRequests } } } }";

/// Build the single-device boolean clock mutation.
///
/// `mutation` is the root field (e.g. `DeviceClockingPreferredLeaderSet`),
/// `input_type` its input object type.
pub fn clock_mutation(mutation: &str, input_type: &str) -> String {
    format!("mutation ControlCommand($input: {input_type}!) {{ {mutation}(input: $input) {{ ok }} }}")
}
