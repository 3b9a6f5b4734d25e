/*!
  Kernel helper functions. A `Call` whose source register is not `Register::FIRST_ARG`
  carries one of these identifiers in its constant. The numbering is the kernel's and must
  not be reordered.
*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

#[derive(
  StrumDisplay, IntoStaticStr, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,       PartialEq,        Debug,         Hash
)]
#[strum(serialize_all = "snake_case")]
#[repr(i32)]
pub enum Func {
  Unspec = 0,
  MapLookupElem,
  MapUpdateElem,
  MapDeleteElem,
  ProbeRead,
  KtimeGetNs,
  TracePrintk,
  #[strum(serialize = "get_prandom_u32")]
  GetPrandomU32,
  GetSmpProcessorId,
  SkbStoreBytes,
  #[strum(serialize = "l3_csum_replace")]
  L3CsumReplace,            // 10
  #[strum(serialize = "l4_csum_replace")]
  L4CsumReplace,
  TailCall,
  CloneRedirect,
  GetCurrentPidTgid,
  GetCurrentUidGid,
  GetCurrentComm,
  GetCgroupClassid,
  SkbVlanPush,
  SkbVlanPop,
  SkbGetTunnelKey,          // 20
  SkbSetTunnelKey,
  PerfEventRead,
  Redirect,
  GetRouteRealm,
  PerfEventOutput,
  SkbLoadBytes,
  GetStackid,
  CsumDiff,
  SkbGetTunnelOpt,
  SkbSetTunnelOpt,          // 30
  SkbChangeProto,
  SkbChangeType,
  SkbUnderCgroup,
  GetHashRecalc,
  GetCurrentTask,
  ProbeWriteUser,
  CurrentTaskUnderCgroup,
  SkbChangeTail,
  SkbPullData,
  CsumUpdate,               // 40
  SetHashInvalid,
  GetNumaNodeId,
  SkbChangeHead,
  XdpAdjustHead,
  ProbeReadStr,
  GetSocketCookie,
  GetSocketUid,
  SetHash,
  Setsockopt,
  SkbAdjustRoom,            // 50
  RedirectMap,
  SkRedirectMap,
  SockMapUpdate,
}

impl Func {
  /// Finds the helper an instruction constant names, if any.
  pub fn lookup(constant: i64) -> Option<Func> {
    let id = i32::try_from(constant).ok()?;
    Func::try_from(id).ok()
  }

  pub fn id(&self) -> i32 {
    Into::<i32>::into(*self)
  }
}

/// Displays a call constant as a helper name, or as `Func(<n>)` when no helper has that
/// number.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct FuncId(pub i64);

impl Display for FuncId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match Func::lookup(self.0) {
      Some(func) => write!(f, "{}", func),
      None       => write!(f, "Func({})", self.0)
    }
  }
}
