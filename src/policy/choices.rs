//! Choice Tables
//!
//! A choice table lists every set of exactly D shard indices from which a
//! whole stripe can be repaired. Each entry is bit-packed: bit `j` set means
//! shard `j` belongs to the subset.
//!
//! Local groups make the table smaller than "any D shards": the right local
//! parity is only useful to the global code when the left one is also known,
//! and a local parity only repairs its own group.
//!
//! Embedded tables are the output of [`derive_table`] for the layouts that
//! ship precomputed. The wide 28+2+3 table (94,711 entries) is derived once
//! on first use instead of being embedded. Other layouts can be derived and
//! passed to `PolicyFactory::with_table`.

use once_cell::sync::Lazy;

use crate::ec::layout::ShardLayout;
use crate::error::{Error, Result};

/// Widest stripe a bit-packed entry can describe
pub const MAX_TABLE_SHARDS: usize = u64::BITS as usize;

/// Precomputed table for a layout, if one ships with the crate
pub fn precomputed(layout: &ShardLayout) -> Option<&'static [u64]> {
    match (layout.data_shards(), layout.global_shards()) {
        (4, 1) => Some(CHOICES_4_2_1),
        (4, 2) => Some(CHOICES_4_2_2),
        (4, 3) => Some(CHOICES_4_2_3),
        (6, 2) => Some(CHOICES_6_2_2),
        (6, 3) => Some(CHOICES_6_2_3),
        (8, 2) => Some(CHOICES_8_2_2),
        (8, 3) => Some(CHOICES_8_2_3),
        (28, 3) => Some(CHOICES_28_2_3.as_slice()),
        _ => None,
    }
}

/// 28 data + 2 local + 3 global, derived on first use
static CHOICES_28_2_3: Lazy<Vec<u64>> = Lazy::new(|| {
    ShardLayout::new(28, 2, 3)
        .and_then(|layout| derive_table(&layout))
        .expect("28+2+3 fits a 64-bit choice entry")
});

/// Expand a bit-packed entry into ascending shard indices
pub fn decode_choice(mask: u64) -> Vec<usize> {
    (0..MAX_TABLE_SHARDS)
        .filter(|&bit| mask & (1u64 << bit) != 0)
        .collect()
}

/// Pack shard indices into a table entry
pub fn encode_choice(shards: &[usize]) -> Result<u64> {
    shards.iter().try_fold(0u64, |mask, &shard| {
        if shard >= MAX_TABLE_SHARDS {
            return Err(Error::InvalidInputShard(shard));
        }
        Ok(mask | (1u64 << shard))
    })
}

/// Enumerate every D-subset of the stripe in lexicographic order and keep
/// the ones a global repair can restore the stripe from.
pub fn derive_table(layout: &ShardLayout) -> Result<Vec<u64>> {
    let total = layout.total_shards();
    if total > MAX_TABLE_SHARDS {
        return Err(Error::InvalidEcConfig(format!(
            "{} shards do not fit a {}-bit choice entry",
            total, MAX_TABLE_SHARDS
        )));
    }

    let k = layout.data_shards();
    let mut combo: Vec<usize> = (0..k).collect();
    let mut present = vec![false; total];
    let mut table = Vec::new();

    loop {
        present.iter_mut().for_each(|p| *p = false);
        for &i in &combo {
            present[i] = true;
        }
        if layout.recoverable(&present) {
            table.push(encode_choice(&combo)?);
        }

        // Advance to the next combination
        let mut i = k;
        loop {
            if i == 0 {
                return Ok(table);
            }
            i -= 1;
            if combo[i] != i + total - k {
                break;
            }
        }
        combo[i] += 1;
        for j in (i + 1)..k {
            combo[j] = combo[j - 1] + 1;
        }
    }
}


// =============================================================================
// Embedded Tables
// =============================================================================

/// 4 data + 2 local + 1 global (27 subsets)
const CHOICES_4_2_1: &[u64] = &[
    15, 39, 71, 43, 75, 99, 29, 77,
    53, 85, 101, 57, 89, 105, 113, 30,
    78, 54, 86, 102, 58, 90, 106, 114,
    92, 116, 120,
];

/// 4 data + 2 local + 2 global (55 subsets)
const CHOICES_4_2_2: &[u64] = &[
    15, 39, 71, 135, 43, 75, 139, 99,
    163, 195, 29, 77, 141, 53, 85, 149,
    101, 165, 197, 57, 89, 153, 105, 169,
    201, 113, 177, 209, 30, 78, 142, 54,
    86, 150, 102, 166, 198, 58, 90, 154,
    106, 170, 202, 114, 178, 210, 92, 156,
    204, 116, 180, 228, 120, 184, 232,
];

/// 4 data + 2 local + 3 global (97 subsets)
const CHOICES_4_2_3: &[u64] = &[
    15, 39, 71, 135, 263, 43, 75, 139,
    267, 99, 163, 291, 195, 323, 387, 29,
    77, 141, 269, 53, 85, 149, 277, 101,
    165, 293, 197, 325, 389, 57, 89, 153,
    281, 105, 169, 297, 201, 329, 393, 113,
    177, 305, 209, 337, 401, 449, 30, 78,
    142, 270, 54, 86, 150, 278, 102, 166,
    294, 198, 326, 390, 58, 90, 154, 282,
    106, 170, 298, 202, 330, 394, 114, 178,
    306, 210, 338, 402, 450, 92, 156, 284,
    204, 332, 396, 116, 180, 308, 228, 356,
    420, 452, 120, 184, 312, 232, 360, 424,
    456,
];

/// 6 data + 2 local + 2 global (153 subsets)
const CHOICES_6_2_2: &[u64] = &[
    63, 159, 287, 543, 175, 303, 559, 399,
    655, 783, 183, 311, 567, 407, 663, 791,
    423, 679, 807, 903, 123, 315, 571, 219,
    347, 603, 411, 667, 795, 235, 363, 619,
    427, 683, 811, 459, 715, 843, 243, 371,
    627, 435, 691, 819, 467, 723, 851, 483,
    739, 867, 963, 125, 317, 573, 221, 349,
    605, 413, 669, 797, 237, 365, 621, 429,
    685, 813, 461, 717, 845, 245, 373, 629,
    437, 693, 821, 469, 725, 853, 485, 741,
    869, 965, 377, 633, 825, 473, 729, 921,
    489, 745, 937, 497, 753, 945, 126, 318,
    574, 222, 350, 606, 414, 670, 798, 238,
    366, 622, 430, 686, 814, 462, 718, 846,
    246, 374, 630, 438, 694, 822, 470, 726,
    854, 486, 742, 870, 966, 378, 634, 826,
    474, 730, 922, 490, 746, 938, 498, 754,
    946, 380, 636, 828, 476, 732, 924, 492,
    748, 940, 500, 756, 948, 888, 984, 1000,
    1008,
];

/// 6 data + 2 local + 3 global (309 subsets)
const CHOICES_6_2_3: &[u64] = &[
    63, 159, 287, 543, 1055, 175, 303, 559,
    1071, 399, 655, 1167, 783, 1295, 1551, 183,
    311, 567, 1079, 407, 663, 1175, 791, 1303,
    1559, 423, 679, 1191, 807, 1319, 1575, 903,
    1415, 1671, 1799, 123, 315, 571, 1083, 219,
    347, 603, 1115, 411, 667, 1179, 795, 1307,
    1563, 235, 363, 619, 1131, 427, 683, 1195,
    811, 1323, 1579, 459, 715, 1227, 843, 1355,
    1611, 1803, 243, 371, 627, 1139, 435, 691,
    1203, 819, 1331, 1587, 467, 723, 1235, 851,
    1363, 1619, 1811, 483, 739, 1251, 867, 1379,
    1635, 1827, 963, 1475, 1731, 1859, 125, 317,
    573, 1085, 221, 349, 605, 1117, 413, 669,
    1181, 797, 1309, 1565, 237, 365, 621, 1133,
    429, 685, 1197, 813, 1325, 1581, 461, 717,
    1229, 845, 1357, 1613, 1805, 245, 373, 629,
    1141, 437, 693, 1205, 821, 1333, 1589, 469,
    725, 1237, 853, 1365, 1621, 1813, 485, 741,
    1253, 869, 1381, 1637, 1829, 965, 1477, 1733,
    1861, 377, 633, 1145, 825, 1337, 1593, 473,
    729, 1241, 921, 1433, 1689, 1817, 489, 745,
    1257, 937, 1449, 1705, 1833, 497, 753, 1265,
    945, 1457, 1713, 1841, 126, 318, 574, 1086,
    222, 350, 606, 1118, 414, 670, 1182, 798,
    1310, 1566, 238, 366, 622, 1134, 430, 686,
    1198, 814, 1326, 1582, 462, 718, 1230, 846,
    1358, 1614, 1806, 246, 374, 630, 1142, 438,
    694, 1206, 822, 1334, 1590, 470, 726, 1238,
    854, 1366, 1622, 1814, 486, 742, 1254, 870,
    1382, 1638, 1830, 966, 1478, 1734, 1862, 378,
    634, 1146, 826, 1338, 1594, 474, 730, 1242,
    922, 1434, 1690, 1818, 490, 746, 1258, 938,
    1450, 1706, 1834, 498, 754, 1266, 946, 1458,
    1714, 1842, 380, 636, 1148, 828, 1340, 1596,
    476, 732, 1244, 924, 1436, 1692, 1820, 492,
    748, 1260, 940, 1452, 1708, 1836, 500, 756,
    1268, 948, 1460, 1716, 1844, 888, 1400, 1656,
    1848, 984, 1496, 1752, 1944, 1000, 1512, 1768,
    1960, 1008, 1520, 1776, 1968,
];

/// 8 data + 2 local + 2 global (341 subsets)
const CHOICES_8_2_2: &[u64] = &[
    255, 639, 1151, 2175, 703, 1215, 2239, 1599,
    2623, 3135, 735, 1247, 2271, 1631, 2655, 3167,
    1695, 2719, 3231, 3615, 751, 1263, 2287, 1647,
    2671, 3183, 1711, 2735, 3247, 3631, 1743, 2767,
    3279, 3663, 3727, 503, 1271, 2295, 887, 1399,
    2423, 1655, 2679, 3191, 951, 1463, 2487, 1719,
    2743, 3255, 1847, 2871, 3383, 983, 1495, 2519,
    1751, 2775, 3287, 1879, 2903, 3415, 1943, 2967,
    3479, 3863, 999, 1511, 2535, 1767, 2791, 3303,
    1895, 2919, 3431, 1959, 2983, 3495, 3879, 1991,
    3015, 3527, 3911, 3975, 507, 1275, 2299, 891,
    1403, 2427, 1659, 2683, 3195, 955, 1467, 2491,
    1723, 2747, 3259, 1851, 2875, 3387, 987, 1499,
    2523, 1755, 2779, 3291, 1883, 2907, 3419, 1947,
    2971, 3483, 3867, 1003, 1515, 2539, 1771, 2795,
    3307, 1899, 2923, 3435, 1963, 2987, 3499, 3883,
    1995, 3019, 3531, 3915, 3979, 1523, 2547, 3315,
    1907, 2931, 3699, 1971, 2995, 3763, 2003, 3027,
    3795, 2019, 3043, 3811, 509, 1277, 2301, 893,
    1405, 2429, 1661, 2685, 3197, 957, 1469, 2493,
    1725, 2749, 3261, 1853, 2877, 3389, 989, 1501,
    2525, 1757, 2781, 3293, 1885, 2909, 3421, 1949,
    2973, 3485, 3869, 1005, 1517, 2541, 1773, 2797,
    3309, 1901, 2925, 3437, 1965, 2989, 3501, 3885,
    1997, 3021, 3533, 3917, 3981, 1525, 2549, 3317,
    1909, 2933, 3701, 1973, 2997, 3765, 2005, 3029,
    3797, 2021, 3045, 3813, 1529, 2553, 3321, 1913,
    2937, 3705, 1977, 3001, 3769, 2009, 3033, 3801,
    2025, 3049, 3817, 3569, 3953, 4017, 4049, 4065,
    510, 1278, 2302, 894, 1406, 2430, 1662, 2686,
    3198, 958, 1470, 2494, 1726, 2750, 3262, 1854,
    2878, 3390, 990, 1502, 2526, 1758, 2782, 3294,
    1886, 2910, 3422, 1950, 2974, 3486, 3870, 1006,
    1518, 2542, 1774, 2798, 3310, 1902, 2926, 3438,
    1966, 2990, 3502, 3886, 1998, 3022, 3534, 3918,
    3982, 1526, 2550, 3318, 1910, 2934, 3702, 1974,
    2998, 3766, 2006, 3030, 3798, 2022, 3046, 3814,
    1530, 2554, 3322, 1914, 2938, 3706, 1978, 3002,
    3770, 2010, 3034, 3802, 2026, 3050, 3818, 3570,
    3954, 4018, 4050, 4066, 1532, 2556, 3324, 1916,
    2940, 3708, 1980, 3004, 3772, 2012, 3036, 3804,
    2028, 3052, 3820, 3572, 3956, 4020, 4052, 4068,
    3576, 3960, 4024, 4056, 4072,
];

/// 8 data + 2 local + 3 global (771 subsets)
const CHOICES_8_2_3: &[u64] = &[
    255, 639, 1151, 2175, 4223, 703, 1215, 2239,
    4287, 1599, 2623, 4671, 3135, 5183, 6207, 735,
    1247, 2271, 4319, 1631, 2655, 4703, 3167, 5215,
    6239, 1695, 2719, 4767, 3231, 5279, 6303, 3615,
    5663, 6687, 7199, 751, 1263, 2287, 4335, 1647,
    2671, 4719, 3183, 5231, 6255, 1711, 2735, 4783,
    3247, 5295, 6319, 3631, 5679, 6703, 7215, 1743,
    2767, 4815, 3279, 5327, 6351, 3663, 5711, 6735,
    7247, 3727, 5775, 6799, 7311, 7695, 503, 1271,
    2295, 4343, 887, 1399, 2423, 4471, 1655, 2679,
    4727, 3191, 5239, 6263, 951, 1463, 2487, 4535,
    1719, 2743, 4791, 3255, 5303, 6327, 1847, 2871,
    4919, 3383, 5431, 6455, 7223, 983, 1495, 2519,
    4567, 1751, 2775, 4823, 3287, 5335, 6359, 1879,
    2903, 4951, 3415, 5463, 6487, 7255, 1943, 2967,
    5015, 3479, 5527, 6551, 7319, 3863, 5911, 6935,
    7447, 999, 1511, 2535, 4583, 1767, 2791, 4839,
    3303, 5351, 6375, 1895, 2919, 4967, 3431, 5479,
    6503, 7271, 1959, 2983, 5031, 3495, 5543, 6567,
    7335, 3879, 5927, 6951, 7463, 1991, 3015, 5063,
    3527, 5575, 6599, 7367, 3911, 5959, 6983, 7495,
    3975, 6023, 7047, 7559, 7943, 507, 1275, 2299,
    4347, 891, 1403, 2427, 4475, 1659, 2683, 4731,
    3195, 5243, 6267, 955, 1467, 2491, 4539, 1723,
    2747, 4795, 3259, 5307, 6331, 1851, 2875, 4923,
    3387, 5435, 6459, 7227, 987, 1499, 2523, 4571,
    1755, 2779, 4827, 3291, 5339, 6363, 1883, 2907,
    4955, 3419, 5467, 6491, 7259, 1947, 2971, 5019,
    3483, 5531, 6555, 7323, 3867, 5915, 6939, 7451,
    1003, 1515, 2539, 4587, 1771, 2795, 4843, 3307,
    5355, 6379, 1899, 2923, 4971, 3435, 5483, 6507,
    7275, 1963, 2987, 5035, 3499, 5547, 6571, 7339,
    3883, 5931, 6955, 7467, 1995, 3019, 5067, 3531,
    5579, 6603, 7371, 3915, 5963, 6987, 7499, 3979,
    6027, 7051, 7563, 7947, 1523, 2547, 4595, 3315,
    5363, 6387, 1907, 2931, 4979, 3699, 5747, 6771,
    7283, 1971, 2995, 5043, 3763, 5811, 6835, 7347,
    2003, 3027, 5075, 3795, 5843, 6867, 7379, 2019,
    3043, 5091, 3811, 5859, 6883, 7395, 509, 1277,
    2301, 4349, 893, 1405, 2429, 4477, 1661, 2685,
    4733, 3197, 5245, 6269, 957, 1469, 2493, 4541,
    1725, 2749, 4797, 3261, 5309, 6333, 1853, 2877,
    4925, 3389, 5437, 6461, 7229, 989, 1501, 2525,
    4573, 1757, 2781, 4829, 3293, 5341, 6365, 1885,
    2909, 4957, 3421, 5469, 6493, 7261, 1949, 2973,
    5021, 3485, 5533, 6557, 7325, 3869, 5917, 6941,
    7453, 1005, 1517, 2541, 4589, 1773, 2797, 4845,
    3309, 5357, 6381, 1901, 2925, 4973, 3437, 5485,
    6509, 7277, 1965, 2989, 5037, 3501, 5549, 6573,
    7341, 3885, 5933, 6957, 7469, 1997, 3021, 5069,
    3533, 5581, 6605, 7373, 3917, 5965, 6989, 7501,
    3981, 6029, 7053, 7565, 7949, 1525, 2549, 4597,
    3317, 5365, 6389, 1909, 2933, 4981, 3701, 5749,
    6773, 7285, 1973, 2997, 5045, 3765, 5813, 6837,
    7349, 2005, 3029, 5077, 3797, 5845, 6869, 7381,
    2021, 3045, 5093, 3813, 5861, 6885, 7397, 1529,
    2553, 4601, 3321, 5369, 6393, 1913, 2937, 4985,
    3705, 5753, 6777, 7289, 1977, 3001, 5049, 3769,
    5817, 6841, 7353, 2009, 3033, 5081, 3801, 5849,
    6873, 7385, 2025, 3049, 5097, 3817, 5865, 6889,
    7401, 3569, 5617, 6641, 7409, 3953, 6001, 7025,
    7793, 4017, 6065, 7089, 7857, 4049, 6097, 7121,
    7889, 4065, 6113, 7137, 7905, 510, 1278, 2302,
    4350, 894, 1406, 2430, 4478, 1662, 2686, 4734,
    3198, 5246, 6270, 958, 1470, 2494, 4542, 1726,
    2750, 4798, 3262, 5310, 6334, 1854, 2878, 4926,
    3390, 5438, 6462, 7230, 990, 1502, 2526, 4574,
    1758, 2782, 4830, 3294, 5342, 6366, 1886, 2910,
    4958, 3422, 5470, 6494, 7262, 1950, 2974, 5022,
    3486, 5534, 6558, 7326, 3870, 5918, 6942, 7454,
    1006, 1518, 2542, 4590, 1774, 2798, 4846, 3310,
    5358, 6382, 1902, 2926, 4974, 3438, 5486, 6510,
    7278, 1966, 2990, 5038, 3502, 5550, 6574, 7342,
    3886, 5934, 6958, 7470, 1998, 3022, 5070, 3534,
    5582, 6606, 7374, 3918, 5966, 6990, 7502, 3982,
    6030, 7054, 7566, 7950, 1526, 2550, 4598, 3318,
    5366, 6390, 1910, 2934, 4982, 3702, 5750, 6774,
    7286, 1974, 2998, 5046, 3766, 5814, 6838, 7350,
    2006, 3030, 5078, 3798, 5846, 6870, 7382, 2022,
    3046, 5094, 3814, 5862, 6886, 7398, 1530, 2554,
    4602, 3322, 5370, 6394, 1914, 2938, 4986, 3706,
    5754, 6778, 7290, 1978, 3002, 5050, 3770, 5818,
    6842, 7354, 2010, 3034, 5082, 3802, 5850, 6874,
    7386, 2026, 3050, 5098, 3818, 5866, 6890, 7402,
    3570, 5618, 6642, 7410, 3954, 6002, 7026, 7794,
    4018, 6066, 7090, 7858, 4050, 6098, 7122, 7890,
    4066, 6114, 7138, 7906, 1532, 2556, 4604, 3324,
    5372, 6396, 1916, 2940, 4988, 3708, 5756, 6780,
    7292, 1980, 3004, 5052, 3772, 5820, 6844, 7356,
    2012, 3036, 5084, 3804, 5852, 6876, 7388, 2028,
    3052, 5100, 3820, 5868, 6892, 7404, 3572, 5620,
    6644, 7412, 3956, 6004, 7028, 7796, 4020, 6068,
    7092, 7860, 4052, 6100, 7124, 7892, 4068, 6116,
    7140, 7908, 3576, 5624, 6648, 7416, 3960, 6008,
    7032, 7800, 4024, 6072, 7096, 7864, 4056, 6104,
    7128, 7896, 4072, 6120, 7144, 7912, 7664, 8048,
    8112, 8144, 8160,
];
