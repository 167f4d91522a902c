//! Wireshark text-export samples shared by the unit tests.

pub const CREATE_GEM_REQUEST: &str = "No.     Time           Source                Destination           Protocol Length Info
    174 9.664179       ZTE_00:11:22          Broadcom_33:44:55     OMCI     48     OLT> Create - GEM Port Network CTP

Frame 174: 48 bytes on wire (384 bits), 48 bytes captured (384 bits)
Ethernet II, Src: ZTE_00:11:22 (00:11:22:33:44:55), Dst: Broadcom_33:44:55 (66:77:88:99:aa:bb)
OMCI Protocol, OLT> Create - GEM Port Network CTP
    Transaction Correlation ID: 12
    Message Type = Create (68)
    0... .... = Destination Bit: 0x0
    .1.. .... = Acknowledge Request: 0x1
    Device Identifier: Baseline (0x0a)
    Message Identifier
        Managed Entity Class: GEM Port Network CTP (268)
        Managed Entity Instance: 257
    Message Contents
        Port id value: 1025
        T-CONT pointer: 0x8001
        Traffic management pointer for upstream: 0x8001
        Priority queue pointer for downstream: 0x0000
    OMCI Trailer: 0x00000028
        CPCS-UU: 0x00
";

pub const CREATE_GEM_RESPONSE: &str = "No.     Time           Source                Destination           Protocol Length Info
    175 9.671002       Broadcom_33:44:55     ZTE_00:11:22          OMCI     48     ONU< Create Response - GEM Port Network CTP

Frame 175: 48 bytes on wire (384 bits), 48 bytes captured (384 bits)
OMCI Protocol, ONU< Create Response - GEM Port Network CTP
    Transaction Correlation ID: 12
    Message Type = Create Response (36)
    Managed Entity Class: GEM Port Network CTP (268)
    Managed Entity Instance: 257
    Result: Command processed successfully (0)
    OMCI Trailer: 0x00000028
";

pub const GET_ONT_G_REQUEST: &str = "No.     Time           Source                Destination           Protocol Length Info
    12 1.000100       ZTE_00:11:22          Broadcom_33:44:55     OMCI     48     OLT> Get - ONT-G

OMCI Protocol, OLT> Get - ONT-G
    Transaction ID: 0x00A1
    Managed Entity Class: ONT-G (0x0100)
    Instance = 0
    Attribute Mask: 0x8000
";

pub const MIB_UPLOAD_RESPONSE_FAILED: &str = "No.     Time           Source                Destination           Protocol Length Info
    20 2.500000       Broadcom_33:44:55     ZTE_00:11:22          OMCI     48     ONU< MIB Upload - ONT Data

OMCI Protocol, ONU< MIB Upload - ONT Data
    Transaction Correlation ID: 3
    Message Type = MIB Upload (77)
    Managed Entity Instance: 0
    Result: Parameter error (3)
";

/// Create exchange as newer Wireshark dissectors print it: a raw
/// `Message Type: 0x44` byte line plus a bitfield breakdown.
pub const WIRESHARK_CREATE_REQUEST: &str = "No.     Time           Source                Destination           Protocol Length Info
    301 14.000100      ZTE_00:11:22          Broadcom_33:44:55     OMCI     48     OLT> Create - GEM Port Network CTP

OMCI Protocol, OLT> Create - GEM Port Network CTP
    Transaction Correlation ID: 40
    Message Type: 0x44
        0... .... = Destination Bit: 0x0
        .1.. .... = Acknowledge Request: 0x1
        ...0 0100 = Message Type: Create (4)
    Managed Entity Class: GEM Port Network CTP (268)
    Managed Entity Instance: 258
        T-CONT pointer: 0x8001
";

pub const WIRESHARK_CREATE_RESPONSE: &str = "No.     Time           Source                Destination           Protocol Length Info
    302 14.006000      Broadcom_33:44:55     ZTE_00:11:22          OMCI     48     ONU< Create Response - GEM Port Network CTP

OMCI Protocol, ONU< Create Response - GEM Port Network CTP
    Transaction Correlation ID: 40
    Message Type: 0x24
        ...0 0100 = Message Type: Create (4)
    Managed Entity Class: GEM Port Network CTP (268)
    Managed Entity Instance: 258
    Result: Command processed successfully (0)
";

/// Link-layer frame from the same capture; carries no OMCI payload.
pub const LINK_LAYER_NOISE: &str = "No.     Time           Source                Destination           Protocol Length Info
    176 9.700000       aa:bb:cc:dd:ee:ff     Broadcast             ARP      60     Who has 10.0.0.1?

Frame 176: 60 bytes on wire (480 bits), 60 bytes captured (480 bits)
Ethernet II, Src: aa:bb:cc:dd:ee:ff, Dst: Broadcast (ff:ff:ff:ff:ff:ff)
";
