//! Per-cast RNG seed derivation.

use data_runtime::ids::ActorId;

/// Mix the world seed with the actor and its monotonic cast id (splitmix64
/// finalizer) so per-actor outcome streams are independent and replays with
/// the same world seed are bit-reproducible.
#[must_use]
pub fn seed_for_cast(world_seed: u64, actor: ActorId, cast_id: u64) -> u64 {
    let mut z = world_seed ^ (u64::from(actor.0) << 32) ^ cast_id;
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
