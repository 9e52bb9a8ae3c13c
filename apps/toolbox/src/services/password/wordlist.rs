/// Short, unambiguous English words for passphrases.
pub const WORDS: &[&str] = &[
    "able", "acid", "acorn", "actor", "adapt", "agent", "alarm", "album", "alley", "amber",
    "anchor", "angle", "apple", "april", "arena", "armor", "arrow", "atlas", "audio", "autumn",
    "badge", "bagel", "baker", "bamboo", "banjo", "barrel", "basil", "beach", "beacon", "berry",
    "bison", "blade", "blanket", "bloom", "border", "bottle", "brave", "bread", "brick", "bridge",
    "bronze", "brush", "bucket", "buffalo", "butter", "cabin", "cactus", "camel", "candle", "canoe",
    "canyon", "carbon", "carpet", "castle", "cedar", "cellar", "chalk", "cherry", "chess", "cider",
    "cinema", "circle", "citrus", "clover", "cobalt", "cocoa", "comet", "copper", "coral", "cotton",
    "coyote", "crane", "crater", "cricket", "crystal", "cupboard", "dahlia", "dance", "delta", "desert",
    "diamond", "dinner", "dolphin", "domino", "dragon", "drift", "eagle", "easel", "echo", "eclipse",
    "ember", "engine", "falcon", "fabric", "feather", "fiddle", "flint", "forest", "fossil", "fountain",
    "galaxy", "garden", "garlic", "gecko", "ginger", "glacier", "globe", "granite", "gravel", "harbor",
    "harvest", "hazel", "helmet", "heron", "hollow", "honey", "horizon", "hornet", "husky", "iceberg",
    "igloo", "indigo", "island", "ivory", "jacket", "jaguar", "jasmine", "jelly", "jigsaw", "jungle",
    "kayak", "kernel", "kettle", "kiwi", "koala", "ladder", "lagoon", "lantern", "laser", "lemon",
    "lentil", "library", "lilac", "lobster", "locket", "lotus", "magnet", "mango", "maple", "marble",
    "meadow", "melon", "meteor", "mirror", "mosaic", "muffin", "napkin", "nebula", "needle", "nickel",
    "nutmeg", "oasis", "ocean", "olive", "onion", "orbit", "orchid", "otter", "oyster", "paddle",
    "panda", "paper", "parrot", "pebble", "pepper", "piano", "pilot", "planet", "plaza", "pocket",
    "polar", "pumpkin", "puzzle", "quartz", "quiver", "rabbit", "radar", "raven", "ribbon", "river",
    "rocket", "saddle", "salmon", "sapphire", "scarf", "shadow", "signal", "silver", "sketch", "spruce",
    "summit", "sunset", "teapot", "thunder", "tiger", "timber", "tomato", "topaz", "tractor", "tundra",
    "turtle", "umbrella", "valley", "velvet", "violet", "volcano", "walnut", "whistle", "willow", "window",
    "winter", "wizard", "yogurt", "zebra", "zephyr", "zinnia",
];
